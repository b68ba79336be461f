//! Utility functions and helpers
//!
//! This module contains cryptographic primitives, the canonical record
//! encoder, and other helpers used throughout the ledger.

pub mod crypto;
pub mod serialization;

pub use crypto::{
    base58_decode, base58_encode, current_timestamp, decode_hex, ecdsa_p256_key_pair,
    ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify, hash_record, new_key_pair,
    p256_private_key_from_pkcs8, ripemd160_digest, sha256_digest, P256_PRIVATE_KEY_LEN,
};

pub use serialization::{canonical_bytes, canonical_encode, format_float};
