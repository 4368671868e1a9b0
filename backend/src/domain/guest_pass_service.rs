//! Guest-pass transitions: request, approve with code issue, reject, cancel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use uuid::Uuid;

use super::error::Error;
use super::guest_pass::{GuestPass, GuestPassStatus, GuestPassWithNames, generate_pass_code};
use super::ports::GuestPassRepository;
use super::principal::{AdminId, ResidentId};

/// Validated input for a new pass request.
#[derive(Debug, Clone)]
pub struct NewGuestPass {
    pub guest_name: String,
    pub visit_date: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Guest-pass service.
#[derive(Clone)]
pub struct GuestPassService {
    passes: Arc<dyn GuestPassRepository>,
    clock: Arc<dyn Clock>,
}

impl GuestPassService {
    /// Create a new service.
    pub fn new(passes: Arc<dyn GuestPassRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { passes, clock }
    }

    /// Resident requests a visitor authorisation.
    pub async fn request(
        &self,
        owner: ResidentId,
        request: NewGuestPass,
    ) -> Result<GuestPassWithNames, Error> {
        let guest_name = request.guest_name.trim().to_owned();
        if guest_name.is_empty() {
            return Err(Error::invalid_request("guest name is required"));
        }

        let now = self.clock.utc();
        let pass = GuestPass {
            id: Uuid::new_v4(),
            resident_id: owner,
            guest_name,
            visit_date: request.visit_date,
            reason: request
                .reason
                .map(|r| r.trim().to_owned())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "Personal Visit".to_owned()),
            code: None,
            status: GuestPassStatus::Pending,
            handled_by: None,
            created_at: now,
            updated_at: now,
        };
        self.passes.insert(&pass).await?;
        self.passes
            .find_with_names(pass.id)
            .await?
            .ok_or_else(|| Error::internal("guest pass vanished after insert"))
    }

    /// A resident's own passes, latest visit first.
    pub async fn my_passes(&self, owner: ResidentId) -> Result<Vec<GuestPassWithNames>, Error> {
        Ok(self.passes.list_for_resident(owner).await?)
    }

    /// All passes for the admin queue, newest request first.
    pub async fn all_passes(&self) -> Result<Vec<GuestPassWithNames>, Error> {
        Ok(self.passes.list_all().await?)
    }

    /// Admin approves a pending pass, issuing its gate code.
    pub async fn approve(&self, id: Uuid, admin: AdminId) -> Result<GuestPassWithNames, Error> {
        let mut pass = self.load(id).await?;
        Self::require_pending(&pass)?;
        pass.code = Some(generate_pass_code(&mut rand::thread_rng()));
        pass.status = GuestPassStatus::Approved;
        pass.handled_by = Some(admin);
        pass.updated_at = self.clock.utc();
        self.passes.update(&pass).await?;
        self.joined(id).await
    }

    /// Admin rejects a pending pass; no code is ever assigned.
    pub async fn reject(&self, id: Uuid, admin: AdminId) -> Result<GuestPassWithNames, Error> {
        let mut pass = self.load(id).await?;
        Self::require_pending(&pass)?;
        pass.status = GuestPassStatus::Rejected;
        pass.handled_by = Some(admin);
        pass.updated_at = self.clock.utc();
        self.passes.update(&pass).await?;
        self.joined(id).await
    }

    /// Resident cancels their own pending request.
    pub async fn cancel(&self, id: Uuid, caller: ResidentId) -> Result<GuestPassWithNames, Error> {
        let mut pass = self.load(id).await?;
        if pass.resident_id != caller {
            return Err(Error::unauthorized("not your guest pass"));
        }
        Self::require_pending(&pass)?;
        pass.status = GuestPassStatus::Cancelled;
        pass.updated_at = self.clock.utc();
        self.passes.update(&pass).await?;
        self.joined(id).await
    }

    async fn load(&self, id: Uuid) -> Result<GuestPass, Error> {
        self.passes
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("guest pass not found"))
    }

    async fn joined(&self, id: Uuid) -> Result<GuestPassWithNames, Error> {
        self.passes
            .find_with_names(id)
            .await?
            .ok_or_else(|| Error::internal("guest pass vanished after update"))
    }

    fn require_pending(pass: &GuestPass) -> Result<(), Error> {
        if pass.status == GuestPassStatus::Pending {
            Ok(())
        } else {
            Err(Error::invalid_request("this pass is not pending"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::memory::MemoryStore;
    use chrono::{Duration, TimeZone};
    use mockable::MockClock;
    use rstest::rstest;

    fn fixture_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 8, 0, 0)
            .single()
            .expect("valid fixture instant")
    }

    fn service() -> GuestPassService {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(fixture_now);
        GuestPassService::new(Arc::new(MemoryStore::new()), Arc::new(clock))
    }

    fn request() -> NewGuestPass {
        NewGuestPass {
            guest_name: "Vikram Shah".into(),
            visit_date: fixture_now() + Duration::days(2),
            reason: None,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn approve_issues_code_once() {
        let service = service();
        let owner = ResidentId::random();
        let admin = AdminId::random();
        let pass = service.request(owner, request()).await.expect("request");
        assert!(pass.pass.code.is_none());

        let approved = service.approve(pass.pass.id, admin).await.expect("approve");
        assert_eq!(approved.pass.status, GuestPassStatus::Approved);
        let code = approved.pass.code.expect("code issued on approval");
        assert!(code.starts_with("GP-"));
        assert_eq!(approved.pass.handled_by, Some(admin));

        // Approving again is no longer allowed.
        let err = service
            .approve(pass.pass.id, admin)
            .await
            .expect_err("second approve must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[actix_web::test]
    async fn reject_never_sets_a_code() {
        let service = service();
        let pass = service
            .request(ResidentId::random(), request())
            .await
            .expect("request");
        let rejected = service
            .reject(pass.pass.id, AdminId::random())
            .await
            .expect("reject");
        assert_eq!(rejected.pass.status, GuestPassStatus::Rejected);
        assert!(rejected.pass.code.is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn cancel_requires_ownership_and_pending() {
        let service = service();
        let owner = ResidentId::random();
        let pass = service.request(owner, request()).await.expect("request");

        let err = service
            .cancel(pass.pass.id, ResidentId::random())
            .await
            .expect_err("stranger cannot cancel");
        assert_eq!(err.code(), ErrorCode::Unauthorized);

        service
            .cancel(pass.pass.id, owner)
            .await
            .expect("owner cancels pending pass");

        let err = service
            .cancel(pass.pass.id, owner)
            .await
            .expect_err("cancelled pass is no longer pending");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[actix_web::test]
    async fn request_requires_guest_name() {
        let service = service();
        let mut bad = request();
        bad.guest_name = "   ".into();
        let err = service
            .request(ResidentId::random(), bad)
            .await
            .expect_err("blank guest name");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
