//! Core ledger functionality
//!
//! This module contains the ledger data model (transactions and blocks),
//! proof-of-work consensus, and the ledger engine that ties them together.

pub mod block;
pub mod blockchain;
pub mod monetary;
pub mod observer;
pub mod proof_of_work;
pub mod transaction;

pub use block::Block;
pub use blockchain::Blockchain;
pub use monetary::{MAX_DIFFICULTY, MINING_DIFFICULTY, MINING_REWARD, MINING_SENDER};
pub use observer::{LedgerObserver, LogObserver, NoopObserver};
pub use proof_of_work::{CancellationToken, PowOutcome, ProofOfWork};
pub use transaction::Transaction;
