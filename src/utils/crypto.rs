use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use ring::digest::{Context, SHA256};
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, ECDSA_P256_SHA256_FIXED, ECDSA_P256_SHA256_FIXED_SIGNING};
use ripemd::{Digest as RipemdDigest, Ripemd160};
use serde_json::Value;

use crate::error::{LedgerError, Result};
use crate::utils::serialization::canonical_bytes;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, with sub-second precision
pub fn current_timestamp() -> Result<f64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LedgerError::Crypto(format!("System time error: {e}")))?;
    Ok(duration.as_secs_f64())
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

pub fn ripemd160_digest(data: &[u8]) -> Vec<u8> {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// SHA-256 of the canonical encoding of `record`, as lowercase hex
pub fn hash_record(record: &Value) -> String {
    HEXLOWER.encode(&sha256_digest(&canonical_bytes(record)))
}

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| LedgerError::InvalidAddress(format!("Invalid base58 encoding: {e}")))
}

/// Decode caller-supplied hex, requiring an exact byte length
pub fn decode_hex(what: &str, data: &str, expected_len: usize) -> Result<Vec<u8>> {
    let bytes = HEXLOWER_PERMISSIVE
        .decode(data.as_bytes())
        .map_err(|e| LedgerError::MalformedInput(format!("{what} is not valid hex: {e}")))?;
    if bytes.len() != expected_len {
        return Err(LedgerError::MalformedInput(format!(
            "{what} must be {expected_len} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

pub fn new_key_pair() -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
        .map_err(|e| LedgerError::Crypto(format!("Failed to generate ECDSA key pair: {e}")))?
        .as_ref()
        .to_vec();
    Ok(pkcs8)
}

// ECPrivateKey version 1 followed by the 32-byte OCTET STRING header
const EC_PRIVATE_KEY_MARKER: [u8; 5] = [0x02, 0x01, 0x01, 0x04, 0x20];
pub const P256_PRIVATE_KEY_LEN: usize = 32;

/// Pull the raw P-256 private scalar out of a PKCS#8 document
pub fn p256_private_key_from_pkcs8(pkcs8: &[u8]) -> Result<Vec<u8>> {
    let start = pkcs8
        .windows(EC_PRIVATE_KEY_MARKER.len())
        .position(|window| window == EC_PRIVATE_KEY_MARKER)
        .map(|index| index + EC_PRIVATE_KEY_MARKER.len())
        .ok_or_else(|| LedgerError::Crypto("PKCS8 document has no P-256 private key".to_string()))?;
    pkcs8
        .get(start..start + P256_PRIVATE_KEY_LEN)
        .map(|scalar| scalar.to_vec())
        .ok_or_else(|| LedgerError::Crypto("PKCS8 private key is truncated".to_string()))
}

/// `private_key` is the raw scalar, `public_key` the matching SEC1 uncompressed point
pub fn ecdsa_p256_key_pair(private_key: &[u8], public_key: &[u8]) -> Result<EcdsaKeyPair> {
    let rng = SystemRandom::new();
    EcdsaKeyPair::from_private_key_and_public_key(
        &ECDSA_P256_SHA256_FIXED_SIGNING,
        private_key,
        public_key,
        &rng,
    )
    .map_err(|e| LedgerError::Crypto(format!("Private and public key do not match: {e}")))
}

pub fn ecdsa_p256_sha256_sign_digest(
    private_key: &[u8],
    public_key: &[u8],
    message: &[u8],
) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let key_pair = ecdsa_p256_key_pair(private_key, public_key)?;
    let signature = key_pair
        .sign(&rng, message)
        .map_err(|e| LedgerError::Crypto(format!("Failed to sign message: {e}")))?
        .as_ref()
        .to_vec();
    Ok(signature)
}

/// `public_key` is the SEC1 uncompressed point (`0x04 || X || Y`)
pub fn ecdsa_p256_sha256_sign_verify(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let peer_public_key =
        ring::signature::UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, public_key);
    peer_public_key.verify(message, signature).is_ok()
}
