use crate::core::Transaction;
use crate::error::{LedgerError, Result};
use crate::utils::{
    base58_decode, base58_encode, decode_hex, ecdsa_p256_key_pair, ecdsa_p256_sha256_sign_digest,
    ecdsa_p256_sha256_sign_verify, new_key_pair, p256_private_key_from_pkcs8, ripemd160_digest,
    sha256_digest, P256_PRIVATE_KEY_LEN,
};
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
use zeroize::Zeroizing;

/// Network version prefix byte
const VERSION: u8 = 0x00;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;
const PUB_KEY_HASH_LEN: usize = 20;
/// Decoded address payload: version, key hash, checksum
pub const ADDRESS_PAYLOAD_LEN: usize = 1 + PUB_KEY_HASH_LEN + ADDRESS_CHECK_SUM_LEN;
/// Raw public point length (`X || Y`)
pub const PUBLIC_KEY_LEN: usize = 64;
/// Fixed-width `r || s` signature length
pub const SIGNATURE_LEN: usize = 64;

const SEC1_UNCOMPRESSED_TAG: u8 = 0x04;

#[derive(Clone)]
pub struct Wallet {
    private_key: Zeroizing<Vec<u8>>,
    public_key: Vec<u8>,
    address: String,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("public_key", &HEXLOWER.encode(&self.public_key))
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Generate a fresh P-256 keypair from the system CSPRNG and derive its address
    pub fn new() -> Result<Wallet> {
        let pkcs8 = Zeroizing::new(new_key_pair()?);
        Self::from_pkcs8(&pkcs8)
    }

    pub fn from_pkcs8(pkcs8: &[u8]) -> Result<Wallet> {
        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
            .map_err(|e| {
                LedgerError::Crypto(format!("Failed to create key pair from PKCS8: {e}"))
            })?;
        let private_key = Zeroizing::new(p256_private_key_from_pkcs8(pkcs8)?);
        // ring hands back the SEC1 uncompressed point; the ledger works with bare X || Y
        let public_key = key_pair.public_key().as_ref()[1..].to_vec();
        Ok(Self::assemble(private_key, public_key))
    }

    /// Load a wallet exported as a raw 32-byte private scalar and its public key, both hex.
    ///
    /// ring cannot derive the public point on its own, so both halves are required;
    /// they are checked against each other before the wallet is built.
    pub fn from_private_key_hex(private_key: &str, public_key: &str) -> Result<Wallet> {
        let private_key = Zeroizing::new(decode_hex(
            "private key",
            private_key,
            P256_PRIVATE_KEY_LEN,
        )?);
        let point = parse_public_key(public_key)?;
        ecdsa_p256_key_pair(&private_key, &point)?;
        Ok(Self::assemble(private_key, point[1..].to_vec()))
    }

    fn assemble(private_key: Zeroizing<Vec<u8>>, public_key: Vec<u8>) -> Wallet {
        let address = derive_address(&public_key);
        Wallet {
            private_key,
            public_key,
            address,
        }
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    pub fn get_public_key(&self) -> &[u8] {
        self.public_key.as_slice()
    }

    pub fn public_key_hex(&self) -> String {
        HEXLOWER.encode(&self.public_key)
    }

    /// The raw private scalar, 64 hex characters
    pub fn private_key_hex(&self) -> String {
        HEXLOWER.encode(&self.private_key)
    }

    pub fn sign_transaction(&self, transaction: &Transaction) -> Result<String> {
        sign(&self.private_key, &self.public_key, transaction)
    }
}

/// SHA-256 then RIPEMD-160 of the raw public point
pub fn hash_pub_key(pub_key: &[u8]) -> Vec<u8> {
    let pub_key_sha256 = sha256_digest(raw_point(pub_key));
    ripemd160_digest(pub_key_sha256.as_slice())
}

fn raw_point(pub_key: &[u8]) -> &[u8] {
    match pub_key.split_first() {
        Some((&SEC1_UNCOMPRESSED_TAG, rest)) if rest.len() == PUBLIC_KEY_LEN => rest,
        _ => pub_key,
    }
}

fn sec1_point(pub_key: &[u8]) -> Vec<u8> {
    let mut point = Vec::with_capacity(PUBLIC_KEY_LEN + 1);
    point.push(SEC1_UNCOMPRESSED_TAG);
    point.extend_from_slice(raw_point(pub_key));
    point
}

fn checksum(payload: &[u8]) -> Vec<u8> {
    let first_sha = sha256_digest(payload);
    let second_sha = sha256_digest(first_sha.as_slice());
    second_sha[0..ADDRESS_CHECK_SUM_LEN].to_vec()
}

/// Derive the ledger address for a public point.
///
/// The version prefix, key hash and checksum are joined as lowercase hex text and
/// it is that ASCII text, not the underlying bytes, that gets Base58-encoded.
/// Existing addresses depend on this, so it must not be "fixed".
pub fn derive_address(pub_key: &[u8]) -> String {
    let mut versioned = vec![VERSION];
    versioned.extend(hash_pub_key(pub_key));
    let checksum = checksum(&versioned);
    let text = format!("{}{}", HEXLOWER.encode(&versioned), HEXLOWER.encode(&checksum));
    base58_encode(text.as_bytes())
}

/// Check that an address decodes to version, key hash and a matching checksum
pub fn validate_address(address: &str) -> bool {
    let payload = match base58_decode(address) {
        Ok(payload) => payload,
        Err(_) => return false,
    };
    let bytes = match HEXLOWER.decode(&payload) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    if bytes.len() != ADDRESS_PAYLOAD_LEN || bytes[0] != VERSION {
        return false;
    }

    let (versioned, actual_checksum) = bytes.split_at(bytes.len() - ADDRESS_CHECK_SUM_LEN);
    checksum(versioned) == actual_checksum
}

fn transaction_digest(transaction: &Transaction) -> Vec<u8> {
    sha256_digest(transaction.canonical().as_bytes())
}

/// Sign the digest of the transaction's canonical encoding; returns hex.
/// `public_key` is the signer's point, raw or SEC1.
pub fn sign(private_key: &[u8], public_key: &[u8], transaction: &Transaction) -> Result<String> {
    let digest = transaction_digest(transaction);
    let signature = ecdsa_p256_sha256_sign_digest(private_key, &sec1_point(public_key), &digest)?;
    Ok(HEXLOWER.encode(&signature))
}

/// Verify a hex signature against a hex public key for `transaction`.
///
/// A well-formed signature that does not match yields `Ok(false)`. Input that is not
/// hex of the expected length is a caller bug and comes back as `MalformedInput`.
pub fn verify(public_key: &str, signature: &str, transaction: &Transaction) -> Result<bool> {
    let point = parse_public_key(public_key)?;
    let signature = decode_hex("signature", signature, SIGNATURE_LEN)?;
    let digest = transaction_digest(transaction);
    Ok(ecdsa_p256_sha256_sign_verify(&point, &signature, &digest))
}

/// Accepts bare `X || Y` or SEC1 uncompressed hex; returns the SEC1 form
fn parse_public_key(public_key: &str) -> Result<Vec<u8>> {
    let bytes = HEXLOWER_PERMISSIVE
        .decode(public_key.as_bytes())
        .map_err(|e| LedgerError::MalformedInput(format!("public key is not valid hex: {e}")))?;
    match bytes.len() {
        PUBLIC_KEY_LEN => Ok(sec1_point(&bytes)),
        len if len == PUBLIC_KEY_LEN + 1 && bytes[0] == SEC1_UNCOMPRESSED_TAG => Ok(bytes),
        len => Err(LedgerError::MalformedInput(format!(
            "public key must be {PUBLIC_KEY_LEN} bytes, got {len}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transaction(value: f64) -> Transaction {
        Transaction::new("sender-address", "recipient-address", value).unwrap()
    }

    #[test]
    fn test_known_address_vector() {
        let public_key: Vec<u8> = (0u8..64).collect();
        assert_eq!(
            derive_address(&public_key),
            "bSNZvfXQq59hkwjGZKUfSVgh1Jxa9vmSuY7H1Y2cAgV7Dp52ZtT1vJgK6qJZV59qUYbV"
        );
    }

    #[test]
    fn test_sec1_prefix_does_not_change_address() {
        let raw: Vec<u8> = (0u8..64).collect();
        let mut sec1 = vec![SEC1_UNCOMPRESSED_TAG];
        sec1.extend_from_slice(&raw);
        assert_eq!(derive_address(&raw), derive_address(&sec1));
    }

    #[test]
    fn test_address_is_deterministic_and_valid() {
        let wallet = Wallet::new().unwrap();
        assert_eq!(derive_address(wallet.get_public_key()), wallet.get_address());
        assert!(validate_address(wallet.get_address()));
    }

    #[test]
    fn test_independent_wallets_differ() {
        let first = Wallet::new().unwrap();
        let second = Wallet::new().unwrap();
        assert_ne!(first.get_address(), second.get_address());
        assert_ne!(first.public_key_hex(), second.public_key_hex());
    }

    #[test]
    fn test_validate_address_rejects_tampering() {
        let wallet = Wallet::new().unwrap();
        let address = wallet.get_address();
        let mut payload = base58_decode(address).unwrap();
        let last = payload.len() - 1;
        payload[last] = if payload[last] == b'0' { b'1' } else { b'0' };
        assert!(!validate_address(&base58_encode(&payload)));
        assert!(!validate_address("not-base58-0OIl"));
        assert!(!validate_address(""));
    }

    #[test]
    fn test_public_key_hex_is_raw_point() {
        let wallet = Wallet::new().unwrap();
        assert_eq!(wallet.public_key_hex().len(), PUBLIC_KEY_LEN * 2);
    }

    #[test]
    fn test_raw_private_key_round_trip() {
        let wallet = Wallet::new().unwrap();
        let private_key = wallet.private_key_hex();
        assert_eq!(private_key.len(), P256_PRIVATE_KEY_LEN * 2);

        let restored = Wallet::from_private_key_hex(&private_key, &wallet.public_key_hex()).unwrap();
        assert_eq!(restored.get_address(), wallet.get_address());
        assert_eq!(restored.private_key_hex(), private_key);

        let tx = sample_transaction(4.0);
        let signature = restored.sign_transaction(&tx).unwrap();
        assert!(verify(&wallet.public_key_hex(), &signature, &tx).unwrap());
    }

    #[test]
    fn test_import_accepts_sec1_public_key() {
        let wallet = Wallet::new().unwrap();
        let sec1 = format!("04{}", wallet.public_key_hex());
        let restored = Wallet::from_private_key_hex(&wallet.private_key_hex(), &sec1).unwrap();
        assert_eq!(restored.get_public_key(), wallet.get_public_key());
    }

    #[test]
    fn test_import_rejects_mismatched_keys() {
        let wallet = Wallet::new().unwrap();
        let other = Wallet::new().unwrap();
        assert!(matches!(
            Wallet::from_private_key_hex(&wallet.private_key_hex(), &other.public_key_hex()),
            Err(LedgerError::Crypto(_))
        ));
        assert!(matches!(
            Wallet::from_private_key_hex("abcd", &wallet.public_key_hex()),
            Err(LedgerError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_validate_address_requires_exact_length() {
        // well-formed checksum over a payload one byte too long
        let mut versioned = vec![VERSION];
        versioned.extend([7u8; PUB_KEY_HASH_LEN + 1]);
        let text = format!(
            "{}{}",
            HEXLOWER.encode(&versioned),
            HEXLOWER.encode(&checksum(&versioned))
        );
        assert!(!validate_address(&base58_encode(text.as_bytes())));

        let mut wrong_version = vec![0x01];
        wrong_version.extend([7u8; PUB_KEY_HASH_LEN]);
        let text = format!(
            "{}{}",
            HEXLOWER.encode(&wrong_version),
            HEXLOWER.encode(&checksum(&wrong_version))
        );
        assert!(!validate_address(&base58_encode(text.as_bytes())));
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let wallet = Wallet::new().unwrap();
        let tx = sample_transaction(1.0);
        let signature = wallet.sign_transaction(&tx).unwrap();
        assert_eq!(signature.len(), SIGNATURE_LEN * 2);
        assert!(verify(&wallet.public_key_hex(), &signature, &tx).unwrap());
    }

    #[test]
    fn test_flipped_signature_byte_fails() {
        let wallet = Wallet::new().unwrap();
        let tx = sample_transaction(1.0);
        let signature = wallet.sign_transaction(&tx).unwrap();
        let mut bytes = HEXLOWER.decode(signature.as_bytes()).unwrap();
        for index in [0, 31, 32, 63] {
            let original = bytes[index];
            bytes[index] ^= 0x01;
            let tampered = HEXLOWER.encode(&bytes);
            assert!(!verify(&wallet.public_key_hex(), &tampered, &tx).unwrap());
            bytes[index] = original;
        }
    }

    #[test]
    fn test_changed_value_fails() {
        let wallet = Wallet::new().unwrap();
        let signature = wallet.sign_transaction(&sample_transaction(1.0)).unwrap();
        assert!(!verify(&wallet.public_key_hex(), &signature, &sample_transaction(1.5)).unwrap());
    }

    #[test]
    fn test_wrong_public_key_fails() {
        let signer = Wallet::new().unwrap();
        let other = Wallet::new().unwrap();
        let tx = sample_transaction(2.0);
        let signature = signer.sign_transaction(&tx).unwrap();
        assert!(!verify(&other.public_key_hex(), &signature, &tx).unwrap());
    }

    #[test]
    fn test_sec1_public_key_accepted() {
        let wallet = Wallet::new().unwrap();
        let tx = sample_transaction(3.0);
        let signature = wallet.sign_transaction(&tx).unwrap();
        let sec1 = format!("04{}", wallet.public_key_hex());
        assert!(verify(&sec1, &signature, &tx).unwrap());
    }

    #[test]
    fn test_malformed_hex_is_an_error() {
        let wallet = Wallet::new().unwrap();
        let tx = sample_transaction(1.0);
        let signature = wallet.sign_transaction(&tx).unwrap();

        assert!(matches!(
            verify("xyz", &signature, &tx),
            Err(LedgerError::MalformedInput(_))
        ));
        assert!(matches!(
            verify(&wallet.public_key_hex()[..10], &signature, &tx),
            Err(LedgerError::MalformedInput(_))
        ));
        assert!(matches!(
            verify(&wallet.public_key_hex(), "abcd", &tx),
            Err(LedgerError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let wallet = Wallet::new().unwrap();
        let debug = format!("{wallet:?}");
        assert!(!debug.contains(&wallet.private_key_hex()));
    }
}
