use crate::core::Transaction;
use crate::error::Result;
use crate::utils::{current_timestamp, hash_record};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    timestamp: f64,
    transactions: Vec<Transaction>,
    nonce: u64,
    previous_hash: String,
}

impl Block {
    /// Seal `transactions` into a block stamped with the current time.
    /// The nonce is taken as given; proof-of-work is the caller's job.
    pub fn new_block(
        transactions: Vec<Transaction>,
        nonce: u64,
        previous_hash: String,
    ) -> Result<Block> {
        Ok(Self::with_timestamp(
            current_timestamp()?,
            transactions,
            nonce,
            previous_hash,
        ))
    }

    pub fn with_timestamp(
        timestamp: f64,
        transactions: Vec<Transaction>,
        nonce: u64,
        previous_hash: String,
    ) -> Block {
        Block {
            timestamp,
            transactions,
            nonce,
            previous_hash,
        }
    }

    /// Genesis links to the hash of an empty record and carries no transactions
    pub fn generate_genesis_block() -> Result<Block> {
        Self::new_block(vec![], 0, Self::genesis_previous_hash())
    }

    pub fn genesis_previous_hash() -> String {
        hash_record(&json!({}))
    }

    pub fn get_timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    /// The full block record, timestamp included
    pub fn to_record(&self) -> Value {
        let transactions: Vec<Value> = self.transactions.iter().map(Transaction::to_record).collect();
        json!({
            "timestamp": self.timestamp,
            "transactions": transactions,
            "nonce": self.nonce,
            "previous_hash": self.previous_hash,
        })
    }

    /// Hash over every field; this is what the next block links to
    pub fn hash(&self) -> String {
        hash_record(&self.to_record())
    }
}
