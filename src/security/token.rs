//! Session token generation and hashing
//!
//! Tokens are 32 random bytes, hex-encoded for transport. The database
//! only ever sees the SHA-256 hex digest.

use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_SIZE: usize = 32;

/// Generate a fresh random session token
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a token for storage or lookup
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest)
}
