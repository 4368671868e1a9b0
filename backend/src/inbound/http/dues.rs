//! Dues ledger handlers.
//!
//! ```text
//! GET   /api/v1/user/dues
//! POST  /api/v1/admin/dues
//! GET   /api/v1/admin/all-dues
//! PATCH /api/v1/admin/dues/{id}/status
//! GET   /api/v1/admin/dashboard-stats
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    CurrentDue, DashboardStats, DueStatus, DueWithOwner, LoginId, NewDue,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bookings::OwnerDto;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_instant, parse_status, require_field};

/// Due creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDueDto {
    #[serde(default)]
    pub login_id: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, rename = "type")]
    pub due_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Status update request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DueStatusDto {
    pub status: String,
}

/// Due representation returned to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DueDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub due_type: String,
    pub amount: i64,
    pub due_date: String,
    pub status: DueStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<String>,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OwnerDto>,
}

impl From<DueWithOwner> for DueDto {
    fn from(joined: DueWithOwner) -> Self {
        Self {
            id: joined.due.id,
            due_type: joined.due.due_type,
            amount: joined.due.amount,
            due_date: joined.due.due_date.to_rfc3339(),
            status: joined.due.status,
            paid_on: joined.due.paid_on.map(|t| t.to_rfc3339()),
            notes: joined.due.notes,
            user: Some(OwnerDto {
                name: joined.owner_name,
                login_id: joined.owner_login_id.into(),
            }),
        }
    }
}

/// The "what do I owe" answer for residents.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentDueDto {
    pub amount: i64,
    pub status: DueStatus,
    pub due_date: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub due_type: Option<String>,
}

impl From<CurrentDue> for CurrentDueDto {
    fn from(current: CurrentDue) -> Self {
        Self {
            amount: current.amount,
            status: current.status,
            due_date: current.due_date.map(|t| t.to_rfc3339()),
            due_type: current.due_type,
        }
    }
}

/// The caller's most pressing outstanding due.
#[utoipa::path(
    get,
    path = "/api/v1/user/dues",
    responses((status = 200, description = "Current due", body = CurrentDueDto)),
    tags = ["dues"],
    operation_id = "currentDue"
)]
#[get("/user/dues")]
pub async fn current_due(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let resident = session.require_resident()?;
    let current = state.dues.current_due(resident).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "dues": CurrentDueDto::from(current) })))
}

/// Admin bills a resident.
#[utoipa::path(
    post,
    path = "/api/v1/admin/dues",
    request_body = CreateDueDto,
    responses(
        (status = 201, description = "Due created", body = DueDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown resident", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["dues"],
    operation_id = "createDue"
)]
#[post("/admin/dues")]
pub async fn create_due(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateDueDto>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let payload = payload.into_inner();

    let login_id = require_field("loginId", payload.login_id.as_deref())?;
    let login_id = LoginId::new(login_id)
        .map_err(|err| crate::domain::Error::invalid_request(err.to_string()))?;
    let amount = payload
        .amount
        .ok_or_else(|| crate::domain::Error::invalid_request("amount is required"))?;
    let due_date = parse_instant(
        "dueDate",
        require_field("dueDate", payload.due_date.as_deref())?,
    )?;

    let due = state
        .dues
        .create(NewDue {
            login_id,
            amount,
            due_date,
            due_type: payload.due_type,
            notes: payload.notes,
        })
        .await?;
    Ok(HttpResponse::Created().json(DueDto::from(due)))
}

/// Every due in the ledger.
#[utoipa::path(
    get,
    path = "/api/v1/admin/all-dues",
    responses((status = 200, description = "Dues", body = [DueDto])),
    tags = ["dues"],
    operation_id = "allDues"
)]
#[get("/admin/all-dues")]
pub async fn all_dues(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<DueDto>>> {
    session.require_admin()?;
    let dues = state.dues.list_all().await?;
    Ok(web::Json(dues.into_iter().map(Into::into).collect()))
}

/// Admin updates a due's ledger status.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/dues/{id}/status",
    request_body = DueStatusDto,
    responses(
        (status = 200, description = "Updated due", body = DueDto),
        (status = 400, description = "Unknown status", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown due", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["dues"],
    operation_id = "setDueStatus"
)]
#[patch("/admin/dues/{id}/status")]
pub async fn set_due_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<DueStatusDto>,
) -> ApiResult<web::Json<DueDto>> {
    session.require_admin()?;
    let status: DueStatus = parse_status("status", &payload.status)?;
    let due = state.dues.set_status(path.into_inner(), status).await?;
    Ok(web::Json(due.into()))
}

/// Resident and ledger counters for the admin dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard-stats",
    responses((status = 200, description = "Counters", body = DashboardStats)),
    tags = ["dues"],
    operation_id = "dashboardStats"
)]
#[get("/admin/dashboard-stats")]
pub async fn dashboard_stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardStats>> {
    session.require_admin()?;
    Ok(web::Json(state.dues.dashboard_stats().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{login_admin, memory_state, signup_resident};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    fn due_body(login_id: &str) -> Value {
        serde_json::json!({
            "loginId": login_id,
            "amount": 2500,
            "dueDate": "2026-07-01T00:00:00Z",
            "notes": "Quarterly maintenance",
        })
    }

    #[rstest]
    #[actix_web::test]
    async fn admin_bills_and_resident_sees_current_due() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;
        let admin = login_admin(&app, &harness.state).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/dues")
                .cookie(admin.clone())
                .set_json(due_body("a-101"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        assert_eq!(created["status"], "Pending");
        assert_eq!(created["type"], "Maintenance");
        assert_eq!(created["user"]["loginId"], "a-101");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/user/dues")
                .cookie(resident)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["dues"]["amount"], 2500);
        assert_eq!(body["dues"]["status"], "Pending");
    }

    #[rstest]
    #[actix_web::test]
    async fn resident_with_no_dues_sees_settled_placeholder() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/user/dues")
                .cookie(resident)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["dues"]["amount"], 0);
        assert_eq!(body["dues"]["status"], "Paid");
        assert_eq!(body["dues"]["dueDate"], Value::Null);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_resident_and_bad_status_are_rejected() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        signup_resident(&app, "a-101", "asha@example.com").await;
        let admin = login_admin(&app, &harness.state).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/dues")
                .cookie(admin.clone())
                .set_json(due_body("z-999"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/dues")
                .cookie(admin.clone())
                .set_json(due_body("a-101"))
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(res).await;
        let id = created["id"].as_str().expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/admin/dues/{id}/status"))
                .cookie(admin.clone())
                .set_json(serde_json::json!({ "status": "Waived" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/admin/dues/{}/status", Uuid::new_v4()))
                .cookie(admin)
                .set_json(serde_json::json!({ "status": "Paid" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn dashboard_stats_report_counts() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        signup_resident(&app, "a-101", "asha@example.com").await;
        let admin = login_admin(&app, &harness.state).await;

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/dues")
                .cookie(admin.clone())
                .set_json(due_body("a-101"))
                .to_request(),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/dashboard-stats")
                .cookie(admin)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["totalResidents"], 1);
        assert_eq!(body["totalDues"], 1);
        assert_eq!(body["pendingDues"], 1);
    }
}
