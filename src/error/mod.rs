//! Error handling for the ledger
//!
//! This module provides the error types shared by every ledger operation.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Structurally invalid hex keys or signatures (a caller bug, not adversarial data)
    MalformedInput(String),
    /// Cryptographic operation errors
    Crypto(String),
    /// Transaction construction errors
    InvalidTransaction(String),
    /// Invalid address format
    InvalidAddress(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
    /// Service transport errors
    Network(String),
    /// Mining was requested without a reward beneficiary
    MissingMiningAddress,
    /// The proof-of-work search ran out of attempts
    SearchExhausted { attempts: u64 },
    /// The proof-of-work search was cancelled
    MiningCancelled,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::MalformedInput(msg) => write!(f, "Malformed input: {msg}"),
            LedgerError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            LedgerError::InvalidTransaction(msg) => write!(f, "Invalid transaction: {msg}"),
            LedgerError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::Network(msg) => write!(f, "Network error: {msg}"),
            LedgerError::MissingMiningAddress => {
                write!(f, "Mining error: no beneficiary address configured")
            }
            LedgerError::SearchExhausted { attempts } => {
                write!(
                    f,
                    "Consensus search exhausted: no valid nonce in {attempts} attempts"
                )
            }
            LedgerError::MiningCancelled => write!(f, "Mining error: search cancelled"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}
