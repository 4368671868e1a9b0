//! Argon2 implementation of the password vault port.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::domain::ports::{PasswordVault, VaultError};

/// Argon2id hashing with per-password salts, stored as PHC strings.
#[derive(Default, Clone)]
pub struct Argon2Vault;

impl Argon2Vault {
    /// Create the vault with the crate's default parameters.
    pub fn new() -> Self {
        Self
    }
}

impl PasswordVault for Argon2Vault {
    fn hash_password(&self, raw: &str) -> Result<String, VaultError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| VaultError::new(err.to_string()))
    }

    fn verify_password(&self, raw: &str, stored: &str) -> Result<bool, VaultError> {
        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            // An unparseable stored hash reads as a failed verification, not
            // an error the caller could distinguish from a wrong password.
            Err(err) => {
                tracing::warn!(error = %err, "stored password hash is malformed");
                return Ok(false);
            }
        };
        Ok(Argon2::default()
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hash_and_verify_round_trip() {
        let vault = Argon2Vault::new();
        let hash = vault.hash_password("correct horse").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(vault.verify_password("correct horse", &hash).expect("verify"));
        assert!(!vault.verify_password("wrong horse", &hash).expect("verify"));
    }

    #[rstest]
    fn malformed_stored_hash_fails_closed() {
        let vault = Argon2Vault::new();
        assert!(!vault.verify_password("pw", "garbage").expect("verify"));
    }
}
