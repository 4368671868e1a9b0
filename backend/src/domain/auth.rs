//! Authentication primitives: login credentials and signup payloads.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use zeroize::Zeroizing;

use super::account::{AccountValidationError, EmailAddress, LoginId, validate_name};
use super::principal::PrincipalKind;

/// Minimum accepted password length at signup.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    #[error(transparent)]
    Account(#[from] AccountValidationError),
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("role must be either \"resident\" or \"admin\"")]
    UnknownKind,
}

/// Validated login credentials used by the authentication service.
///
/// ## Invariants
/// - `login_id` satisfies [`LoginId`] validation.
/// - `password` is non-empty but retains caller-provided whitespace to avoid
///   surprising credential comparisons.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    login_id: LoginId,
    password: Zeroizing<String>,
    kind: PrincipalKind,
}

impl LoginCredentials {
    /// Construct credentials from raw login-id/password/role inputs.
    pub fn try_from_parts(
        login_id: &str,
        password: &str,
        kind: &str,
    ) -> Result<Self, AuthValidationError> {
        let login_id = LoginId::new(login_id.trim())?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        let kind = match kind {
            "resident" | "user" => PrincipalKind::Resident,
            "admin" => PrincipalKind::Admin,
            _ => return Err(AuthValidationError::UnknownKind),
        };
        Ok(Self {
            login_id,
            password: Zeroizing::new(password.to_owned()),
            kind,
        })
    }

    /// Login identifier suitable for account lookups.
    pub fn login_id(&self) -> &LoginId {
        &self.login_id
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Which collection to authenticate against.
    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }
}

/// Validated signup payload for a new resident.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    name: String,
    email: EmailAddress,
    login_id: LoginId,
    phone: Option<String>,
    password: Zeroizing<String>,
}

impl SignupRequest {
    /// Construct a signup request from raw string inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        login_id: &str,
        phone: Option<&str>,
        password: &str,
    ) -> Result<Self, AuthValidationError> {
        let name = validate_name(name)?;
        let email = EmailAddress::new(email)?;
        let login_id = LoginId::new(login_id.trim())?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let phone = phone
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        Ok(Self {
            name,
            email,
            login_id,
            phone,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn login_id(&self) -> &LoginId {
        &self.login_id
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
