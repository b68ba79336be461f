//! Identity layer
//!
//! This module handles keypair generation, address derivation, and
//! transaction signing and verification.

#[allow(clippy::module_inception)]
pub mod wallet;

pub use wallet::{
    derive_address, hash_pub_key, sign, validate_address, verify, Wallet, ADDRESS_CHECK_SUM_LEN,
    PUBLIC_KEY_LEN, SIGNATURE_LEN,
};
