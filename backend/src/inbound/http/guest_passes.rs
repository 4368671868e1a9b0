//! Guest-pass handlers.
//!
//! ```text
//! POST  /api/v1/guestpass/request
//! GET   /api/v1/guestpass/my
//! PATCH /api/v1/guestpass/{id}/cancel
//! GET   /api/v1/guestpass/all
//! PATCH /api/v1/guestpass/{id}/approve
//! PATCH /api/v1/guestpass/{id}/reject
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{GuestPassStatus, GuestPassWithNames, NewGuestPass};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bookings::OwnerDto;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_instant, require_field};

/// Pass request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestPassDto {
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub visit_date: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Guest-pass representation returned to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestPassDto {
    pub id: Uuid,
    pub guest_name: String,
    pub visit_date: String,
    pub reason: String,
    pub status: GuestPassStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub requested_by: OwnerDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handled_by: Option<String>,
}

impl From<GuestPassWithNames> for GuestPassDto {
    fn from(joined: GuestPassWithNames) -> Self {
        Self {
            id: joined.pass.id,
            guest_name: joined.pass.guest_name,
            visit_date: joined.pass.visit_date.to_rfc3339(),
            reason: joined.pass.reason,
            status: joined.pass.status,
            code: joined.pass.code,
            requested_by: OwnerDto {
                name: joined.owner_name,
                login_id: joined.owner_login_id.into(),
            },
            handled_by: joined.handler_login_id.map(Into::into),
        }
    }
}

/// Resident requests a visitor authorisation.
#[utoipa::path(
    post,
    path = "/api/v1/guestpass/request",
    request_body = RequestPassDto,
    responses(
        (status = 201, description = "Pass requested", body = GuestPassDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["guest-passes"],
    operation_id = "requestGuestPass"
)]
#[post("/guestpass/request")]
pub async fn request_pass(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RequestPassDto>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_resident()?;
    let payload = payload.into_inner();

    let guest_name = require_field("guestName", payload.guest_name.as_deref())?;
    let visit_date = parse_instant(
        "visitDate",
        require_field("visitDate", payload.visit_date.as_deref())?,
    )?;

    let pass = state
        .guest_passes
        .request(
            owner,
            NewGuestPass {
                guest_name: guest_name.to_owned(),
                visit_date,
                reason: payload.reason,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(GuestPassDto::from(pass)))
}

/// The caller's own passes.
#[utoipa::path(
    get,
    path = "/api/v1/guestpass/my",
    responses((status = 200, description = "Passes", body = [GuestPassDto])),
    tags = ["guest-passes"],
    operation_id = "myGuestPasses"
)]
#[get("/guestpass/my")]
pub async fn my_passes(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<GuestPassDto>>> {
    let owner = session.require_resident()?;
    let passes = state.guest_passes.my_passes(owner).await?;
    Ok(web::Json(passes.into_iter().map(Into::into).collect()))
}

/// Resident cancels their own pending request.
#[utoipa::path(
    patch,
    path = "/api/v1/guestpass/{id}/cancel",
    responses(
        (status = 200, description = "Pass cancelled", body = GuestPassDto),
        (status = 400, description = "Pass is not pending", body = crate::inbound::http::error::ApiError),
        (status = 401, description = "Not the owner", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown pass", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["guest-passes"],
    operation_id = "cancelGuestPass"
)]
#[patch("/guestpass/{id}/cancel")]
pub async fn cancel_pass(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<GuestPassDto>> {
    let caller = session.require_resident()?;
    let pass = state.guest_passes.cancel(path.into_inner(), caller).await?;
    Ok(web::Json(pass.into()))
}

/// Every pass, for the admin queue.
#[utoipa::path(
    get,
    path = "/api/v1/guestpass/all",
    responses((status = 200, description = "Passes", body = [GuestPassDto])),
    tags = ["guest-passes"],
    operation_id = "allGuestPasses"
)]
#[get("/guestpass/all")]
pub async fn all_passes(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<GuestPassDto>>> {
    session.require_admin()?;
    let passes = state.guest_passes.all_passes().await?;
    Ok(web::Json(passes.into_iter().map(Into::into).collect()))
}

/// Admin approves a pending pass and issues its gate code.
#[utoipa::path(
    patch,
    path = "/api/v1/guestpass/{id}/approve",
    responses(
        (status = 200, description = "Pass approved", body = GuestPassDto),
        (status = 400, description = "Pass is not pending", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown pass", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["guest-passes"],
    operation_id = "approveGuestPass"
)]
#[patch("/guestpass/{id}/approve")]
pub async fn approve_pass(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<GuestPassDto>> {
    let admin = session.require_admin()?;
    let pass = state.guest_passes.approve(path.into_inner(), admin).await?;
    Ok(web::Json(pass.into()))
}

/// Admin rejects a pending pass.
#[utoipa::path(
    patch,
    path = "/api/v1/guestpass/{id}/reject",
    responses(
        (status = 200, description = "Pass rejected", body = GuestPassDto),
        (status = 400, description = "Pass is not pending", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown pass", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["guest-passes"],
    operation_id = "rejectGuestPass"
)]
#[patch("/guestpass/{id}/reject")]
pub async fn reject_pass(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<GuestPassDto>> {
    let admin = session.require_admin()?;
    let pass = state.guest_passes.reject(path.into_inner(), admin).await?;
    Ok(web::Json(pass.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{login_admin, memory_state, signup_resident};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    fn pass_body() -> Value {
        serde_json::json!({
            "guestName": "Vikram Shah",
            "visitDate": "2026-06-12T09:00:00Z",
        })
    }

    #[rstest]
    #[actix_web::test]
    async fn approval_issues_code_and_records_handler() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;
        let admin = login_admin(&app, &harness.state).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/guestpass/request")
                .cookie(resident.clone())
                .set_json(pass_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        assert_eq!(created["status"], "Pending");
        assert_eq!(created["reason"], "Personal Visit");
        assert!(created.get("code").is_none());
        let id = created["id"].as_str().expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/guestpass/{id}/approve"))
                .cookie(admin.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let approved: Value = actix_test::read_body_json(res).await;
        assert_eq!(approved["status"], "Approved");
        assert!(
            approved["code"]
                .as_str()
                .expect("code present")
                .starts_with("GP-")
        );
        assert_eq!(approved["handledBy"], "admin");

        // A decided pass cannot be rejected afterwards.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/guestpass/{id}/reject"))
                .cookie(admin)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn rejection_never_issues_a_code() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;
        let admin = login_admin(&app, &harness.state).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/guestpass/request")
                .cookie(resident)
                .set_json(pass_body())
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(res).await;
        let id = created["id"].as_str().expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/guestpass/{id}/reject"))
                .cookie(admin)
                .to_request(),
        )
        .await;
        let rejected: Value = actix_test::read_body_json(res).await;
        assert_eq!(rejected["status"], "Rejected");
        assert!(rejected.get("code").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn cancel_is_owner_only_and_pending_only() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);
        let owner = signup_resident(&app, "a-101", "asha@example.com").await;
        let other = signup_resident(&app, "b-202", "ravi@example.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/guestpass/request")
                .cookie(owner.clone())
                .set_json(pass_body())
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(res).await;
        let id = created["id"].as_str().expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/guestpass/{id}/cancel"))
                .cookie(other)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/guestpass/{id}/cancel"))
                .cookie(owner.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/guestpass/{id}/cancel"))
                .cookie(owner)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn request_requires_guest_name_and_date() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/guestpass/request")
                .cookie(resident)
                .set_json(serde_json::json!({ "guestName": "Vikram Shah" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
