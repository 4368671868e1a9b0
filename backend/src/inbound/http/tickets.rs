//! Support-ticket handlers, including the OTP closure handshake.
//!
//! ```text
//! POST  /api/v1/tickets
//! GET   /api/v1/tickets/user
//! GET   /api/v1/tickets/{id}
//! POST  /api/v1/tickets/{id}/verify-close-otp
//! GET   /api/v1/admin/tickets
//! GET   /api/v1/admin/tickets/overview
//! GET   /api/v1/admin/tickets/sla-alerts
//! PATCH /api/v1/admin/tickets/{id}/assign
//! POST  /api/v1/admin/tickets/{id}/request-close
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    NewTicket, Ticket, TicketCategory, TicketOverview, TicketPriority, TicketStatus,
    TicketWithOwner,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bookings::OwnerDto;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_status, require_field};

/// Ticket creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Assignment request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTicketDto {
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// OTP submission body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpDto {
    #[serde(default)]
    pub otp: Option<String>,
}

/// Ticket representation returned to clients.
///
/// The stored code never serialises outward, in any state.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub sla_due_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<OwnerDto>,
}

impl From<Ticket> for TicketDto {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title,
            description: ticket.description,
            category: ticket.category,
            priority: ticket.priority,
            status: ticket.status,
            assigned_to: ticket.assigned_to,
            sla_due_at: ticket.sla_due_at.to_rfc3339(),
            closed_at: ticket.closed_at.map(|t| t.to_rfc3339()),
            created_at: ticket.created_at.to_rfc3339(),
            created_by: None,
        }
    }
}

impl From<TicketWithOwner> for TicketDto {
    fn from(joined: TicketWithOwner) -> Self {
        let mut dto = Self::from(joined.ticket);
        dto.created_by = Some(OwnerDto {
            name: joined.owner_name,
            login_id: joined.owner_login_id.into(),
        });
        dto
    }
}

/// Resident opens a ticket.
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = CreateTicketDto,
    responses(
        (status = 201, description = "Ticket created", body = TicketDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["tickets"],
    operation_id = "createTicket"
)]
#[post("/tickets")]
pub async fn create_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTicketDto>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_resident()?;
    let payload = payload.into_inner();

    let title = require_field("title", payload.title.as_deref())?;
    let description = require_field("description", payload.description.as_deref())?;
    let category = match payload.category.as_deref() {
        Some(raw) => parse_status::<TicketCategory>("category", raw)?,
        None => TicketCategory::default(),
    };
    let priority = match payload.priority.as_deref() {
        Some(raw) => parse_status::<TicketPriority>("priority", raw)?,
        None => TicketPriority::default(),
    };

    let ticket = state
        .tickets
        .create(
            owner,
            NewTicket {
                title: title.to_owned(),
                description: description.to_owned(),
                category,
                priority,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(TicketDto::from(ticket)))
}

/// The caller's own tickets.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/user",
    responses((status = 200, description = "Tickets", body = [TicketDto])),
    tags = ["tickets"],
    operation_id = "myTickets"
)]
#[get("/tickets/user")]
pub async fn my_tickets(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TicketDto>>> {
    let owner = session.require_resident()?;
    let tickets = state.tickets.my_tickets(owner).await?;
    Ok(web::Json(tickets.into_iter().map(Into::into).collect()))
}

/// Fetch one ticket; residents may only read their own.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    responses(
        (status = 200, description = "Ticket", body = TicketDto),
        (status = 403, description = "Not the owner", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown ticket", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["tickets"],
    operation_id = "getTicket"
)]
#[get("/tickets/{id}")]
pub async fn get_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<TicketDto>> {
    let principal = session.require_principal()?;
    let ticket = state.tickets.get(path.into_inner(), principal).await?;
    Ok(web::Json(ticket.into()))
}

/// Resident submits the closure code.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/verify-close-otp",
    request_body = VerifyOtpDto,
    responses(
        (status = 200, description = "Ticket closed", body = TicketDto),
        (status = 400, description = "Wrong, expired, or missing code", body = crate::inbound::http::error::ApiError),
        (status = 403, description = "Not the owner", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown ticket", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["tickets"],
    operation_id = "verifyCloseOtp"
)]
#[post("/tickets/{id}/verify-close-otp")]
pub async fn verify_close_otp(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<VerifyOtpDto>,
) -> ApiResult<web::Json<TicketDto>> {
    let caller = session.require_resident()?;
    let otp = require_field("otp", payload.otp.as_deref())?;
    let ticket = state
        .tickets
        .verify_close_otp(path.into_inner(), otp, caller)
        .await?;
    Ok(web::Json(ticket.into()))
}

/// Every ticket, for the admin queue.
#[utoipa::path(
    get,
    path = "/api/v1/admin/tickets",
    responses((status = 200, description = "Tickets", body = [TicketDto])),
    tags = ["tickets"],
    operation_id = "allTickets"
)]
#[get("/admin/tickets")]
pub async fn all_tickets(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TicketDto>>> {
    session.require_admin()?;
    let tickets = state.tickets.all_tickets().await?;
    Ok(web::Json(tickets.into_iter().map(Into::into).collect()))
}

/// Dashboard counters over the ticket collection.
#[utoipa::path(
    get,
    path = "/api/v1/admin/tickets/overview",
    responses((status = 200, description = "Counters", body = TicketOverview)),
    tags = ["tickets"],
    operation_id = "ticketOverview"
)]
#[get("/admin/tickets/overview")]
pub async fn ticket_overview(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<TicketOverview>> {
    session.require_admin()?;
    Ok(web::Json(state.tickets.overview().await?))
}

/// Unclosed tickets past their SLA target.
#[utoipa::path(
    get,
    path = "/api/v1/admin/tickets/sla-alerts",
    responses((status = 200, description = "Breached tickets", body = [TicketDto])),
    tags = ["tickets"],
    operation_id = "slaAlerts"
)]
#[get("/admin/tickets/sla-alerts")]
pub async fn sla_alerts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TicketDto>>> {
    session.require_admin()?;
    let tickets = state.tickets.sla_alerts().await?;
    Ok(web::Json(tickets.into_iter().map(Into::into).collect()))
}

/// Admin hands a ticket to a staff member.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/tickets/{id}/assign",
    request_body = AssignTicketDto,
    responses(
        (status = 200, description = "Ticket assigned", body = TicketDto),
        (status = 400, description = "Missing assignee", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown ticket", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["tickets"],
    operation_id = "assignTicket"
)]
#[patch("/admin/tickets/{id}/assign")]
pub async fn assign_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<AssignTicketDto>,
) -> ApiResult<web::Json<TicketDto>> {
    session.require_admin()?;
    let assignee = require_field("assignedTo", payload.assigned_to.as_deref())?;
    let ticket = state.tickets.assign(path.into_inner(), assignee).await?;
    Ok(web::Json(ticket.into()))
}

/// Admin starts the OTP closure handshake.
#[utoipa::path(
    post,
    path = "/api/v1/admin/tickets/{id}/request-close",
    responses(
        (status = 200, description = "Code issued and delivered", body = TicketDto),
        (status = 400, description = "Ticket not in a closable state", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown ticket", body = crate::inbound::http::error::ApiError),
        (status = 503, description = "Code delivery failed", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["tickets"],
    operation_id = "requestClose"
)]
#[post("/admin/tickets/{id}/request-close")]
pub async fn request_close(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<TicketDto>> {
    session.require_admin()?;
    let ticket = state.tickets.request_close(path.into_inner()).await?;
    Ok(web::Json(ticket.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{login_admin, memory_state, signup_resident};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    fn ticket_body() -> Value {
        serde_json::json!({
            "title": "Leaking tap",
            "description": "Kitchen tap drips all night",
            "category": "Maintenance",
            "priority": "P2",
        })
    }

    #[rstest]
    #[actix_web::test]
    async fn full_otp_closure_flow() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;
        let admin = login_admin(&app, &harness.state).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/tickets")
                .cookie(resident.clone())
                .set_json(ticket_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        assert_eq!(created["status"], "Open");
        assert!(created.get("otp").is_none(), "code never serialises");
        let id = created["id"].as_str().expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/admin/tickets/{id}/request-close"))
                .cookie(admin.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let pending: Value = actix_test::read_body_json(res).await;
        assert_eq!(pending["status"], "Pending Closure");
        assert!(pending.get("otp").is_none(), "code never serialises");

        // The resident received the code out-of-band.
        let (recipient, code) = harness
            .notifier
            .deliveries()
            .pop()
            .expect("code delivered");
        assert_eq!(recipient, "+911234567890");

        // Wrong code first.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/tickets/{id}/verify-close-otp"))
                .cookie(resident.clone())
                .set_json(serde_json::json!({ "otp": "000000" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/tickets/{id}/verify-close-otp"))
                .cookie(resident.clone())
                .set_json(serde_json::json!({ "otp": code }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let closed: Value = actix_test::read_body_json(res).await;
        assert_eq!(closed["status"], "Closed");
        assert!(closed["closedAt"].is_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn non_owner_cannot_verify() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let owner = signup_resident(&app, "a-101", "asha@example.com").await;
        let other = signup_resident(&app, "b-202", "ravi@example.com").await;
        let admin = login_admin(&app, &harness.state).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/tickets")
                .cookie(owner.clone())
                .set_json(ticket_body())
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(res).await;
        let id = created["id"].as_str().expect("id").to_owned();

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/admin/tickets/{id}/request-close"))
                .cookie(admin)
                .to_request(),
        )
        .await;
        let (_, code) = harness.notifier.deliveries().pop().expect("delivered");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/tickets/{id}/verify-close-otp"))
                .cookie(other.clone())
                .set_json(serde_json::json!({ "otp": code }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        // Other residents cannot even read the ticket.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/tickets/{id}"))
                .cookie(other)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn admin_views_and_assignment() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;
        let admin = login_admin(&app, &harness.state).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/tickets")
                .cookie(resident)
                .set_json(ticket_body())
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(res).await;
        let id = created["id"].as_str().expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/admin/tickets/{id}/assign"))
                .cookie(admin.clone())
                .set_json(serde_json::json!({ "assignedTo": "Ravi (electrician)" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let assigned: Value = actix_test::read_body_json(res).await;
        assert_eq!(assigned["status"], "Assigned");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/tickets/overview")
                .cookie(admin.clone())
                .to_request(),
        )
        .await;
        let overview: Value = actix_test::read_body_json(res).await;
        assert_eq!(overview["total"], 1);
        assert_eq!(overview["assigned"], 1);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/tickets")
                .cookie(admin)
                .to_request(),
        )
        .await;
        let all: Value = actix_test::read_body_json(res).await;
        assert_eq!(all[0]["createdBy"]["loginId"], "a-101");
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_fields_are_rejected() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/tickets")
                .cookie(resident)
                .set_json(serde_json::json!({ "title": "No description" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
