//! Deterministic Ed25519 keys for tests.

use std::time::{SystemTime, UNIX_EPOCH};

use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};

const TEST_SEED: &str = "interaction-relay-ed25519-test-key-seed-v1";

pub fn signing_key() -> SigningKey {
    let seed: [u8; 32] = Sha256::digest(TEST_SEED.as_bytes()).into();
    SigningKey::from_bytes(&seed)
}

pub fn public_key_hex() -> String {
    hex::encode(signing_key().verifying_key().to_bytes())
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Sign `timestamp + body` and return the hex signature.
pub fn sign_with_timestamp(body: &[u8], timestamp: &str) -> String {
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    hex::encode(signing_key().sign(&message).to_bytes())
}

/// Sign with the current time, returning `(signature, timestamp)`.
pub fn sign(body: &[u8]) -> (String, String) {
    let timestamp = now().to_string();
    (sign_with_timestamp(body, &timestamp), timestamp)
}
