// A transaction moves `value` from one ledger address to another.
// Only these three fields are hashed and signed; public keys and signatures travel
// alongside a transaction but are never part of it.

use crate::core::monetary::MINING_SENDER;
use crate::error::{LedgerError, Result};
use crate::utils::{canonical_encode, hash_record};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "sender_blockchain_address")]
    sender: String,
    #[serde(rename = "recipient_blockchain_address")]
    recipient: String,
    value: f64,
}

impl Transaction {
    pub fn new(sender: &str, recipient: &str, value: f64) -> Result<Transaction> {
        if !value.is_finite() || value <= 0.0 {
            return Err(LedgerError::InvalidTransaction(format!(
                "value must be a positive number, got {value}"
            )));
        }

        Ok(Transaction {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            value,
        })
    }

    /// Reward transaction issued by the mining sentinel
    pub fn new_reward(recipient: &str, reward: f64) -> Result<Transaction> {
        Self::new(MINING_SENDER, recipient, reward)
    }

    pub fn get_sender(&self) -> &str {
        self.sender.as_str()
    }

    pub fn get_recipient(&self) -> &str {
        self.recipient.as_str()
    }

    pub fn get_value(&self) -> f64 {
        self.value
    }

    pub fn is_reward(&self) -> bool {
        self.sender == MINING_SENDER
    }

    pub fn to_record(&self) -> Value {
        json!({
            "sender_blockchain_address": self.sender,
            "recipient_blockchain_address": self.recipient,
            "value": self.value,
        })
    }

    pub fn canonical(&self) -> String {
        canonical_encode(&self.to_record())
    }

    pub fn hash(&self) -> String {
        hash_record(&self.to_record())
    }
}
