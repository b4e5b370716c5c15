//! Security module: password hashing and session tokens
//!
//! The hashing pepper lives in a local file under the data directory so
//! restarts keep existing password hashes verifiable.

mod hashing;
mod token;

use crate::error::{AppError, Result};
use base64::Engine;
use std::fs;
use std::path::Path;

pub use hashing::HashingManager;

const SECRETS_FILE: &str = "secrets.dat";

/// Security manager combining hashing and token handling
pub struct SecurityManager {
    hashing: HashingManager,
}

impl SecurityManager {
    /// Create a security manager, loading or creating the pepper file
    pub fn new(data_dir: &Path) -> Result<Self> {
        let pepper = load_or_create_pepper(&data_dir.join(SECRETS_FILE))?;
        Ok(Self {
            hashing: HashingManager::new(&pepper),
        })
    }

    /// Security manager with an ephemeral pepper, for tests
    #[cfg(test)]
    pub fn new_for_testing() -> Result<Self> {
        Ok(Self {
            hashing: HashingManager::new(&HashingManager::generate_pepper()),
        })
    }

    // ========== Passwords ==========

    /// Hash a password
    pub fn hash_password(&self, password: &str) -> Result<String> {
        self.hashing.hash_password(password)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        self.hashing.verify_password(password, hash)
    }

    // ========== Session tokens ==========

    /// Generate a fresh session token and the hash to store for it
    pub fn generate_session_token(&self) -> (String, String) {
        let token = token::generate_token();
        let hash = token::hash_token(&token);
        (token, hash)
    }

    /// Hash a presented token for lookup
    pub fn hash_token(&self, token: &str) -> String {
        token::hash_token(token)
    }
}

/// Read the pepper from the secrets file, creating it on first boot
fn load_or_create_pepper(path: &Path) -> Result<Vec<u8>> {
    if path.exists() {
        let encoded = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read secrets file: {e}")))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::Config(format!("Invalid secrets file: {e}")))
    } else {
        let pepper = HashingManager::generate_pepper();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("Failed to create data dir: {e}")))?;
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(&pepper);
        fs::write(path, encoded)
            .map_err(|e| AppError::Config(format!("Failed to write secrets file: {e}")))?;

        Ok(pepper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pepper_survives_restart() {
        let dir = TempDir::new().unwrap();

        let first = SecurityManager::new(dir.path()).unwrap();
        let hash = first.hash_password("password!").unwrap();

        // A second manager over the same data dir reuses the pepper
        let second = SecurityManager::new(dir.path()).unwrap();
        assert!(second.verify_password("password!", &hash).unwrap());
    }

    #[test]
    fn test_session_token_round_trip() {
        let manager = SecurityManager::new_for_testing().unwrap();

        let (token, stored_hash) = manager.generate_session_token();
        assert_eq!(manager.hash_token(&token), stored_hash);
        assert_ne!(token, stored_hash);
    }
}
