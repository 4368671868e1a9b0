//! Resident and administrator account entities.
//!
//! Login identifiers and email addresses are validated newtypes so the rest
//! of the domain can assume well-formed values. Password hashes live on the
//! entities but are never part of any outward serialisation contract; HTTP
//! DTOs select the public fields explicitly.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::principal::{AdminId, ResidentId};

/// Validation errors for account fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    #[error("login id must not be empty")]
    EmptyLoginId,
    #[error("login id must not exceed {max} characters")]
    LoginIdTooLong { max: usize },
    #[error("login id must not contain surrounding whitespace")]
    LoginIdPadded,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must not exceed {max} characters")]
    NameTooLong { max: usize },
}

/// Maximum length accepted for login identifiers.
pub const LOGIN_ID_MAX: usize = 64;
/// Maximum length accepted for display names.
pub const NAME_MAX: usize = 80;

/// Human-facing login identifier for residents (flat number, staff code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoginId(String);

impl LoginId {
    /// Validate and construct a [`LoginId`].
    pub fn new(value: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = value.into();
        if raw.is_empty() || raw.trim().is_empty() {
            return Err(AccountValidationError::EmptyLoginId);
        }
        if raw.trim() != raw {
            return Err(AccountValidationError::LoginIdPadded);
        }
        if raw.chars().count() > LOGIN_ID_MAX {
            return Err(AccountValidationError::LoginIdTooLong { max: LOGIN_ID_MAX });
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for LoginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for LoginId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<LoginId> for String {
    fn from(value: LoginId) -> Self {
        value.0
    }
}

impl TryFrom<String> for LoginId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated email address.
///
/// ## Invariants
/// - contains exactly one `@` with non-empty local and domain parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(value: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let mut parts = trimmed.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || domain.contains('@') || trimmed.len() > 254 {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validate a resident display name.
pub fn validate_name(name: &str) -> Result<String, AccountValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AccountValidationError::EmptyName);
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(AccountValidationError::NameTooLong { max: NAME_MAX });
    }
    Ok(trimmed.to_owned())
}

/// A registered resident.
///
/// `password_hash` holds the PHC-format argon2 string and must never reach a
/// serialisation boundary; inbound DTOs copy the public fields instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Resident {
    pub id: ResidentId,
    pub name: String,
    pub login_id: LoginId,
    pub email: EmailAddress,
    /// Delivery target for out-of-band codes, in E.164 form when present.
    pub phone: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Resident {
    /// Preferred contact channel for out-of-band delivery.
    pub fn contact(&self) -> &str {
        self.phone.as_deref().unwrap_or_else(|| self.email.as_str())
    }
}

/// A management-staff account.
#[derive(Debug, Clone, PartialEq)]
pub struct Admin {
    pub id: AdminId,
    pub login_id: LoginId,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", AccountValidationError::EmptyLoginId)]
    #[case("   ", AccountValidationError::EmptyLoginId)]
    #[case(" A-101", AccountValidationError::LoginIdPadded)]
    fn login_id_rejects_bad_input(#[case] raw: &str, #[case] expected: AccountValidationError) {
        assert_eq!(LoginId::new(raw).expect_err("must fail"), expected);
    }

    #[rstest]
    fn login_id_rejects_overlong_input() {
        let raw = "x".repeat(LOGIN_ID_MAX + 1);
        assert_eq!(
            LoginId::new(raw).expect_err("must fail"),
            AccountValidationError::LoginIdTooLong { max: LOGIN_ID_MAX }
        );
    }

    #[rstest]
    #[case("resident@example.com")]
    #[case("  padded@example.com  ")]
    fn email_accepts_and_trims(#[case] raw: &str) {
        let email = EmailAddress::new(raw).expect("valid");
        assert_eq!(email.as_str(), raw.trim());
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("@example.com")]
    #[case("local@")]
    #[case("two@@signs")]
    fn email_rejects_malformed(#[case] raw: &str) {
        assert_eq!(
            EmailAddress::new(raw).expect_err("must fail"),
            AccountValidationError::InvalidEmail
        );
    }

    #[rstest]
    fn contact_prefers_phone() {
        let resident = Resident {
            id: crate::domain::ResidentId::random(),
            name: "Asha Rao".into(),
            login_id: LoginId::new("A-101").expect("login id"),
            email: EmailAddress::new("asha@example.com").expect("email"),
            phone: Some("+911234567890".into()),
            password_hash: "$argon2id$stub".into(),
            created_at: Utc::now(),
        };
        assert_eq!(resident.contact(), "+911234567890");
    }
}
