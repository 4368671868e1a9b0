//! Notice, maintenance-task, and expense handlers.
//!
//! ```text
//! POST  /api/v1/notices            GET /api/v1/notices
//! POST  /api/v1/maintenance        GET /api/v1/maintenance
//! PATCH /api/v1/maintenance/{id}/status
//! POST  /api/v1/expenses           GET /api/v1/expenses
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Expense, MaintenanceTask, Notice, TaskStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_instant, parse_status, require_field};

/// Notice creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoticeDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Maintenance-task creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Task status update body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusDto {
    pub status: String,
}

/// Expense creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Notice representation.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeDto {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: String,
}

impl From<Notice> for NoticeDto {
    fn from(notice: Notice) -> Self {
        Self {
            id: notice.id,
            title: notice.title,
            body: notice.body,
            created_at: notice.created_at.to_rfc3339(),
        }
    }
}

/// Maintenance-task representation.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub scheduled_date: String,
    pub status: TaskStatus,
}

impl From<MaintenanceTask> for TaskDto {
    fn from(task: MaintenanceTask) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            scheduled_date: task.scheduled_date.to_rfc3339(),
            status: task.status,
        }
    }
}

/// Expense representation.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDto {
    pub id: Uuid,
    pub title: String,
    pub amount: i64,
    pub category: String,
    pub description: String,
    pub date: String,
}

impl From<Expense> for ExpenseDto {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            title: expense.title,
            amount: expense.amount,
            category: expense.category,
            description: expense.description,
            date: expense.spent_on.to_rfc3339(),
        }
    }
}

/// Admin publishes a notice.
#[utoipa::path(
    post,
    path = "/api/v1/notices",
    request_body = CreateNoticeDto,
    responses(
        (status = 201, description = "Notice created", body = NoticeDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["bulletin"],
    operation_id = "createNotice"
)]
#[post("/notices")]
pub async fn create_notice(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateNoticeDto>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let title = require_field("title", payload.title.as_deref())?;
    let body = require_field("body", payload.body.as_deref())?;
    let notice = state.bulletins.create_notice(admin, title, body).await?;
    Ok(HttpResponse::Created().json(NoticeDto::from(notice)))
}

/// Notice board, visible to residents and admins alike.
#[utoipa::path(
    get,
    path = "/api/v1/notices",
    responses((status = 200, description = "Notices", body = [NoticeDto])),
    tags = ["bulletin"],
    operation_id = "listNotices"
)]
#[get("/notices")]
pub async fn list_notices(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<NoticeDto>>> {
    session.require_principal()?;
    let notices = state.bulletins.notices().await?;
    Ok(web::Json(notices.into_iter().map(Into::into).collect()))
}

/// Admin schedules a maintenance task.
#[utoipa::path(
    post,
    path = "/api/v1/maintenance",
    request_body = CreateTaskDto,
    responses(
        (status = 201, description = "Task created", body = TaskDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["bulletin"],
    operation_id = "createTask"
)]
#[post("/maintenance")]
pub async fn create_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTaskDto>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let payload = payload.into_inner();

    let title = require_field("title", payload.title.as_deref())?;
    let scheduled_date = parse_instant(
        "scheduledDate",
        require_field("scheduledDate", payload.scheduled_date.as_deref())?,
    )?;
    let status = payload
        .status
        .as_deref()
        .map(|raw| parse_status::<TaskStatus>("status", raw))
        .transpose()?;

    let task = state
        .bulletins
        .create_task(
            admin,
            title,
            payload.description.as_deref().unwrap_or_default(),
            scheduled_date,
            status,
        )
        .await?;
    Ok(HttpResponse::Created().json(TaskDto::from(task)))
}

/// All maintenance tasks.
#[utoipa::path(
    get,
    path = "/api/v1/maintenance",
    responses((status = 200, description = "Tasks", body = [TaskDto])),
    tags = ["bulletin"],
    operation_id = "listTasks"
)]
#[get("/maintenance")]
pub async fn list_tasks(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TaskDto>>> {
    session.require_admin()?;
    let tasks = state.bulletins.tasks().await?;
    Ok(web::Json(tasks.into_iter().map(Into::into).collect()))
}

/// Admin updates a task's status.
#[utoipa::path(
    patch,
    path = "/api/v1/maintenance/{id}/status",
    request_body = TaskStatusDto,
    responses(
        (status = 200, description = "Updated task", body = TaskDto),
        (status = 400, description = "Unknown status", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown task", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["bulletin"],
    operation_id = "setTaskStatus"
)]
#[patch("/maintenance/{id}/status")]
pub async fn set_task_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<TaskStatusDto>,
) -> ApiResult<web::Json<TaskDto>> {
    session.require_admin()?;
    let status: TaskStatus = parse_status("status", &payload.status)?;
    let task = state
        .bulletins
        .set_task_status(path.into_inner(), status)
        .await?;
    Ok(web::Json(task.into()))
}

/// Admin logs an expense.
#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    request_body = CreateExpenseDto,
    responses(
        (status = 201, description = "Expense logged", body = ExpenseDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["bulletin"],
    operation_id = "createExpense"
)]
#[post("/expenses")]
pub async fn create_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateExpenseDto>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let payload = payload.into_inner();

    let title = require_field("title", payload.title.as_deref())?;
    let amount = payload
        .amount
        .ok_or_else(|| Error::invalid_request("amount is required"))?;
    let category = require_field("category", payload.category.as_deref())?;
    let date = parse_instant("date", require_field("date", payload.date.as_deref())?)?;

    let expense = state
        .bulletins
        .create_expense(
            admin,
            title,
            amount,
            category,
            payload.description.as_deref().unwrap_or_default(),
            date,
        )
        .await?;
    Ok(HttpResponse::Created().json(ExpenseDto::from(expense)))
}

/// All expenses.
#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    responses((status = 200, description = "Expenses", body = [ExpenseDto])),
    tags = ["bulletin"],
    operation_id = "listExpenses"
)]
#[get("/expenses")]
pub async fn list_expenses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ExpenseDto>>> {
    session.require_admin()?;
    let expenses = state.bulletins.expenses().await?;
    Ok(web::Json(expenses.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{login_admin, memory_state, signup_resident};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[actix_web::test]
    async fn notices_flow_from_admin_to_residents() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;
        let admin = login_admin(&app, &harness.state).await;

        // Residents cannot publish.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/notices")
                .cookie(resident.clone())
                .set_json(serde_json::json!({ "title": "Hi", "body": "There" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/notices")
                .cookie(admin)
                .set_json(serde_json::json!({
                    "title": "Water outage",
                    "body": "Tank cleaning on Saturday morning",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/notices")
                .cookie(resident)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body[0]["title"], "Water outage");
    }

    #[rstest]
    #[actix_web::test]
    async fn maintenance_tasks_and_status_updates() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let admin = login_admin(&app, &harness.state).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/maintenance")
                .cookie(admin.clone())
                .set_json(serde_json::json!({
                    "title": "Service the lift",
                    "scheduledDate": "2026-06-20T09:00:00Z",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        assert_eq!(created["status"], "Pending");
        let id = created["id"].as_str().expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/maintenance/{id}/status"))
                .cookie(admin.clone())
                .set_json(serde_json::json!({ "status": "In Progress" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated: Value = actix_test::read_body_json(res).await;
        assert_eq!(updated["status"], "In Progress");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/maintenance/{id}/status"))
                .cookie(admin)
                .set_json(serde_json::json!({ "status": "Paused" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn expense_logging_requires_fields() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let admin = login_admin(&app, &harness.state).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/expenses")
                .cookie(admin.clone())
                .set_json(serde_json::json!({ "title": "Diesel" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/expenses")
                .cookie(admin.clone())
                .set_json(serde_json::json!({
                    "title": "Diesel for generator",
                    "amount": 4200,
                    "category": "Utilities",
                    "date": "2026-06-09T00:00:00Z",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/expenses")
                .cookie(admin)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body[0]["amount"], 4200);
    }
}
