//! Shared test doubles for domain services and HTTP handler tests.

use std::sync::Arc;

use crate::domain::ports::{PasswordVault, VaultError};

/// Reversible stand-in for the argon2 vault.
///
/// Argon2 parameters are tuned for attackers, not test suites; unit tests use
/// this transparent scheme instead.
pub struct PlainVault;

impl PasswordVault for PlainVault {
    fn hash_password(&self, raw: &str) -> Result<String, VaultError> {
        Ok(format!("plain${raw}"))
    }

    fn verify_password(&self, raw: &str, stored: &str) -> Result<bool, VaultError> {
        Ok(stored
            .strip_prefix("plain$")
            .is_some_and(|expected| expected == raw))
    }
}

/// Convenience constructor used throughout the tests.
pub fn plain_vault() -> Arc<dyn PasswordVault> {
    Arc::new(PlainVault)
}
