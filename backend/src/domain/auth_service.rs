//! Identity service: signup, login, principal resolution, admin seeding.
//!
//! One authentication capability serves both principal kinds; per-route
//! authorisation happens on the [`Principal`] tag, not in parallel
//! middlewares.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::account::{Admin, LoginId, Resident};
use super::auth::{LoginCredentials, SignupRequest};
use super::error::Error;
use super::ports::{AccountRepository, PasswordVault};
use super::principal::{AdminId, Principal, PrincipalKind, ResidentId};

/// Display payload returned alongside a fresh session.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub principal: Principal,
    pub name: String,
    pub login_id: LoginId,
    pub email: Option<String>,
}

/// Identity and account service.
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    vault: Arc<dyn PasswordVault>,
}

impl AuthService {
    /// Create a new service over the account repository and password vault.
    pub fn new(accounts: Arc<dyn AccountRepository>, vault: Arc<dyn PasswordVault>) -> Self {
        Self { accounts, vault }
    }

    /// Register a new resident.
    ///
    /// Fails with a conflict when the login id or email is already taken and
    /// creates no record in that case.
    pub async fn signup(&self, request: SignupRequest) -> Result<Resident, Error> {
        if self
            .accounts
            .resident_exists(request.login_id(), request.email())
            .await?
        {
            return Err(Error::conflict("an account with this login id or email already exists"));
        }

        let password_hash = self.vault.hash_password(request.password())?;
        let resident = Resident {
            id: ResidentId::random(),
            name: request.name().to_owned(),
            login_id: request.login_id().clone(),
            email: request.email().clone(),
            phone: request.phone().map(str::to_owned),
            password_hash,
            created_at: Utc::now(),
        };
        // The uniqueness re-check inside insert covers the window between the
        // existence probe and the write.
        self.accounts.insert_resident(&resident).await?;
        Ok(resident)
    }

    /// Authenticate against the collection selected by the credential's kind.
    ///
    /// Missing accounts and hash mismatches produce the same error so the
    /// response does not reveal which of the two failed.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedUser, Error> {
        match credentials.kind() {
            PrincipalKind::Resident => {
                let resident = self
                    .accounts
                    .find_resident_by_login(credentials.login_id())
                    .await?;
                let Some(resident) = resident else {
                    return Err(invalid_credentials());
                };
                if !self
                    .vault
                    .verify_password(credentials.password(), &resident.password_hash)?
                {
                    return Err(invalid_credentials());
                }
                Ok(AuthenticatedUser {
                    principal: Principal::Resident(resident.id),
                    name: resident.name,
                    login_id: resident.login_id,
                    email: Some(resident.email.to_string()),
                })
            }
            PrincipalKind::Admin => {
                let admin = self
                    .accounts
                    .find_admin_by_login(credentials.login_id())
                    .await?;
                let Some(admin) = admin else {
                    return Err(invalid_credentials());
                };
                if !self
                    .vault
                    .verify_password(credentials.password(), &admin.password_hash)?
                {
                    return Err(invalid_credentials());
                }
                Ok(AuthenticatedUser {
                    principal: Principal::Admin(admin.id),
                    name: "Admin".to_owned(),
                    login_id: admin.login_id,
                    email: None,
                })
            }
        }
    }

    /// Resolve a session's resident id back to its record.
    ///
    /// A stale session referencing a deleted account is unauthorized, not an
    /// internal error.
    pub async fn current_resident(&self, id: ResidentId) -> Result<Resident, Error> {
        self.accounts
            .find_resident(id)
            .await?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))
    }

    /// Resolve a session's admin id back to its record.
    pub async fn current_admin(&self, id: AdminId) -> Result<Admin, Error> {
        self.accounts
            .find_admin(id)
            .await?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))
    }

    /// All residents for the admin directory, newest first.
    pub async fn list_residents(&self) -> Result<Vec<Resident>, Error> {
        Ok(self.accounts.list_residents().await?)
    }

    /// Idempotent bootstrap: create the default admin account if absent.
    ///
    /// Invoked once from process initialisation.
    pub async fn ensure_default_admin(
        &self,
        login_id: &LoginId,
        password: &str,
    ) -> Result<(), Error> {
        if self.accounts.find_admin_by_login(login_id).await?.is_some() {
            return Ok(());
        }
        let admin = Admin {
            id: AdminId::random(),
            login_id: login_id.clone(),
            password_hash: self.vault.hash_password(password)?,
            created_at: Utc::now(),
        };
        self.accounts.insert_admin(&admin).await?;
        info!(admin = %login_id, "default admin account created");
        Ok(())
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::memory::MemoryStore;
    use crate::domain::{ErrorCode, test_support};
    use rstest::rstest;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()), test_support::plain_vault())
    }

    fn signup_request(login_id: &str, email: &str) -> SignupRequest {
        SignupRequest::try_from_parts("Asha Rao", email, login_id, None, "secret-password")
            .expect("valid signup")
    }

    #[rstest]
    #[actix_web::test]
    async fn signup_then_login_round_trips() {
        let service = service();
        let resident = service
            .signup(signup_request("a-101", "asha@example.com"))
            .await
            .expect("signup succeeds");

        let creds = LoginCredentials::try_from_parts("a-101", "secret-password", "resident")
            .expect("valid credentials");
        let user = service.login(&creds).await.expect("login succeeds");
        assert_eq!(user.principal, Principal::Resident(resident.id));
        assert_eq!(user.login_id.as_str(), "a-101");
    }

    #[rstest]
    #[case("a-101", "other@example.com")]
    #[case("b-202", "asha@example.com")]
    #[actix_web::test]
    async fn signup_rejects_reused_identity(#[case] login_id: &str, #[case] email: &str) {
        let service = service();
        service
            .signup(signup_request("a-101", "asha@example.com"))
            .await
            .expect("first signup succeeds");

        let err = service
            .signup(signup_request(login_id, email))
            .await
            .expect_err("duplicate identity must fail");
        assert_eq!(err.code(), ErrorCode::Conflict);

        // No second record was created.
        let residents = service.list_residents().await.expect("list");
        assert_eq!(residents.len(), 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn login_rejects_wrong_password_and_wrong_kind() {
        let service = service();
        service
            .signup(signup_request("a-101", "asha@example.com"))
            .await
            .expect("signup succeeds");

        let wrong_password =
            LoginCredentials::try_from_parts("a-101", "nope", "resident").expect("credentials");
        let err = service.login(&wrong_password).await.expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);

        // Same login id against the admin collection finds nothing.
        let wrong_kind =
            LoginCredentials::try_from_parts("a-101", "secret-password", "admin")
                .expect("credentials");
        let err = service.login(&wrong_kind).await.expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[actix_web::test]
    async fn default_admin_seeding_is_idempotent() {
        let service = service();
        let login = LoginId::new("admin").expect("login id");
        service
            .ensure_default_admin(&login, "Admin@123")
            .await
            .expect("first seed");
        service
            .ensure_default_admin(&login, "Admin@123")
            .await
            .expect("second seed is a no-op");

        let creds = LoginCredentials::try_from_parts("admin", "Admin@123", "admin")
            .expect("credentials");
        let user = service.login(&creds).await.expect("admin login");
        assert!(user.principal.as_admin().is_some());
    }
}
