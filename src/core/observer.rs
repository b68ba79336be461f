//! Ledger event reporting
//!
//! The engine reports significant events to an injected observer instead of
//! writing to a process-wide stream.

use crate::core::{Block, Transaction};
use log::{info, warn};

pub trait LedgerObserver: Send + Sync {
    fn on_transaction_admitted(&self, _transaction: &Transaction) {}

    fn on_transaction_rejected(&self, _sender: &str, _recipient: &str, _reason: &str) {}

    fn on_block_mined(&self, _block: &Block) {}
}

/// Forwards ledger events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl LedgerObserver for LogObserver {
    fn on_transaction_admitted(&self, transaction: &Transaction) {
        info!(
            "Transaction admitted: {} -> {} ({})",
            transaction.get_sender(),
            transaction.get_recipient(),
            transaction.get_value()
        );
    }

    fn on_transaction_rejected(&self, sender: &str, recipient: &str, reason: &str) {
        warn!("Transaction rejected: {sender} -> {recipient}: {reason}");
    }

    fn on_block_mined(&self, block: &Block) {
        info!(
            "Mining succeeded: nonce {} with {} transactions, previous hash {}",
            block.get_nonce(),
            block.get_transactions().len(),
            block.get_previous_hash()
        );
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LedgerObserver for NoopObserver {}
