//! # powledger - a single-process proof-of-work ledger
//!
//! An append-only chain of blocks, each sealing a pool of value transfers,
//! linked by SHA-256 hashes and admitted only after a proof-of-work puzzle is
//! solved. Wallets are P-256 keypairs with Bitcoin-style Base58 addresses.
//!
//! ## Layout
//! - `core/`: transactions, blocks, proof-of-work and the ledger engine
//! - `wallet/`: keypairs, address derivation, signing and verification
//! - `storage/`: the pending transaction pool
//! - `utils/`: hashing, Base58, ECDSA primitives and the canonical encoder
//! - `config/`: settings from defaults, TOML and the environment
//! - `service/`: request/response facade and a line-delimited JSON server
//! - `cli/`: command-line interface
//!
//! ## Things to keep in mind
//! - Everything that gets hashed or signed goes through the canonical encoder,
//!   so field order never changes a digest.
//! - A block links to the hash of the *whole* previous block, while
//!   proof-of-work is computed over a view without the timestamp.
//! - Balances are a full scan of the chain; there is no UTXO index.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod service;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::LedgerConfig;
pub use core::{
    Block, Blockchain, CancellationToken, LedgerObserver, LogObserver, NoopObserver, PowOutcome,
    ProofOfWork, Transaction, MINING_DIFFICULTY, MINING_REWARD, MINING_SENDER,
};
pub use error::{LedgerError, Result};
pub use service::{LedgerService, Request, Response, Server, TransactionRequest};
pub use storage::TransactionPool;
pub use utils::{canonical_encode, hash_record};
pub use wallet::{derive_address, sign, validate_address, verify, Wallet};
