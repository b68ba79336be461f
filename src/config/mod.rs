//! Configuration management
//!
//! This module handles ledger settings: proof-of-work difficulty and bounds,
//! mining reward and beneficiary, admission policy, and the service address.

pub mod settings;

pub use settings::LedgerConfig;
