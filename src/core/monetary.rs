//! Ledger monetary and consensus constants
//!
//! ## Rewards
//! - **Mining sentinel**: the reserved sender identity that issues block rewards.
//!   Transactions from it skip signature verification.
//! - **Mining reward**: 1.0 per mined block, paid to the configured beneficiary.
//!
//! ## Consensus
//! - **Difficulty**: a candidate block hash must start with this many `'0'` hex digits.

/// Reserved sender identity for reward transactions
pub const MINING_SENDER: &str = "THE BLOCKCHAIN";

/// Reward paid to the miner for each sealed block
pub const MINING_REWARD: f64 = 1.0;

/// Default number of leading zero hex digits required by proof-of-work
pub const MINING_DIFFICULTY: usize = 3;

/// Longest possible prefix requirement for a 256-bit hex digest
pub const MAX_DIFFICULTY: usize = 64;
