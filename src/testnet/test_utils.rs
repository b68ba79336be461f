//! Test utilities for ledger testing

use crate::config::LedgerConfig;
use crate::core::{Block, Blockchain, LedgerObserver, Transaction};
use crate::wallet::Wallet;
use std::sync::{Arc, Mutex};

/// Observer that remembers every event it sees
#[derive(Default)]
pub struct RecordingObserver {
    admitted: Mutex<Vec<Transaction>>,
    rejected: Mutex<Vec<String>>,
    mined: Mutex<usize>,
}

impl RecordingObserver {
    pub fn admitted(&self) -> Vec<Transaction> {
        self.admitted.lock().unwrap().clone()
    }

    pub fn rejected(&self) -> Vec<String> {
        self.rejected.lock().unwrap().clone()
    }

    pub fn mined(&self) -> usize {
        *self.mined.lock().unwrap()
    }
}

impl LedgerObserver for RecordingObserver {
    fn on_transaction_admitted(&self, transaction: &Transaction) {
        self.admitted.lock().unwrap().push(transaction.clone());
    }

    fn on_transaction_rejected(&self, _sender: &str, _recipient: &str, reason: &str) {
        self.rejected.lock().unwrap().push(reason.to_string());
    }

    fn on_block_mined(&self, _block: &Block) {
        *self.mined.lock().unwrap() += 1;
    }
}

/// Easy difficulty so searches finish quickly
pub fn test_config(miner: &str) -> LedgerConfig {
    LedgerConfig::default()
        .with_difficulty(1)
        .with_miner_address(miner)
}

/// Create an in-memory ledger paying rewards to `miner`
pub fn create_test_blockchain(miner: &str) -> (Blockchain, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let blockchain = Blockchain::with_observer(test_config(miner), observer.clone())
        .expect("test ledger should build");
    (blockchain, observer)
}

/// Sign `wallet -> recipient` for `value`; returns (public key hex, signature hex)
pub fn signed_transfer(wallet: &Wallet, recipient: &str, value: f64) -> (String, String) {
    let transaction = Transaction::new(wallet.get_address(), recipient, value)
        .expect("test transaction should be valid");
    let signature = wallet
        .sign_transaction(&transaction)
        .expect("signing should succeed");
    (wallet.public_key_hex(), signature)
}
