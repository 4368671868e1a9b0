//! Poll handlers.
//!
//! ```text
//! POST   /api/v1/polls
//! GET    /api/v1/polls
//! GET    /api/v1/polls/{id}
//! POST   /api/v1/polls/{id}/vote
//! DELETE /api/v1/polls/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Poll};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_field;

/// Poll creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollDto {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Vote request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteDto {
    #[serde(default)]
    pub option_index: Option<i64>,
}

/// One option with its tally.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionDto {
    pub text: String,
    pub votes: u32,
}

/// Poll representation returned to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollDto {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<PollOptionDto>,
    pub created_at: String,
}

impl From<Poll> for PollDto {
    fn from(poll: Poll) -> Self {
        Self {
            id: poll.id,
            question: poll.question,
            options: poll
                .options
                .into_iter()
                .map(|option| PollOptionDto {
                    text: option.text,
                    votes: option.votes,
                })
                .collect(),
            created_at: poll.created_at.to_rfc3339(),
        }
    }
}

/// Admin creates a poll.
#[utoipa::path(
    post,
    path = "/api/v1/polls",
    request_body = CreatePollDto,
    responses(
        (status = 201, description = "Poll created", body = PollDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["polls"],
    operation_id = "createPoll"
)]
#[post("/polls")]
pub async fn create_poll(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePollDto>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let payload = payload.into_inner();
    let question = require_field("question", payload.question.as_deref())?;
    let poll = state
        .polls
        .create(admin, question, payload.options)
        .await?;
    Ok(HttpResponse::Created().json(PollDto::from(poll)))
}

/// All polls.
#[utoipa::path(
    get,
    path = "/api/v1/polls",
    responses((status = 200, description = "Polls", body = [PollDto])),
    tags = ["polls"],
    operation_id = "listPolls"
)]
#[get("/polls")]
pub async fn list_polls(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<PollDto>>> {
    session.require_principal()?;
    let polls = state.polls.list().await?;
    Ok(web::Json(polls.into_iter().map(Into::into).collect()))
}

/// Fetch one poll.
#[utoipa::path(
    get,
    path = "/api/v1/polls/{id}",
    responses(
        (status = 200, description = "Poll", body = PollDto),
        (status = 404, description = "Unknown poll", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["polls"],
    operation_id = "getPoll"
)]
#[get("/polls/{id}")]
pub async fn get_poll(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<PollDto>> {
    session.require_principal()?;
    let poll = state.polls.get(path.into_inner()).await?;
    Ok(web::Json(poll.into()))
}

/// Resident casts a ballot.
#[utoipa::path(
    post,
    path = "/api/v1/polls/{id}/vote",
    request_body = VoteDto,
    responses(
        (status = 200, description = "Updated poll", body = PollDto),
        (status = 400, description = "Invalid option", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown poll", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["polls"],
    operation_id = "vote"
)]
#[post("/polls/{id}/vote")]
pub async fn vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<VoteDto>,
) -> ApiResult<web::Json<PollDto>> {
    session.require_resident()?;
    let index = payload
        .option_index
        .ok_or_else(|| Error::invalid_request("invalid option selected"))?;
    let index = usize::try_from(index)
        .map_err(|_| Error::invalid_request("invalid option selected"))?;
    let poll = state.polls.vote(path.into_inner(), index).await?;
    Ok(web::Json(poll.into()))
}

/// Admin removes a poll.
#[utoipa::path(
    delete,
    path = "/api/v1/polls/{id}",
    responses(
        (status = 200, description = "Poll removed"),
        (status = 404, description = "Unknown poll", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["polls"],
    operation_id = "deletePoll"
)]
#[delete("/polls/{id}")]
pub async fn delete_poll(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let id = path.into_inner();
    state.polls.delete(id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{login_admin, memory_state, signup_resident};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    fn poll_body() -> Value {
        serde_json::json!({
            "question": "Repaint the lobby?",
            "options": ["Yes", "No", "Later"],
        })
    }

    async fn create_poll_via_api(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        admin: &actix_web::cookie::Cookie<'static>,
    ) -> String {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/polls")
                .cookie(admin.clone())
                .set_json(poll_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        created["id"].as_str().expect("id").to_owned()
    }

    #[rstest]
    #[actix_web::test]
    async fn vote_increments_exactly_one_option() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;
        let admin = login_admin(&app, &harness.state).await;
        let id = create_poll_via_api(&app, &admin).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/polls/{id}/vote"))
                .cookie(resident)
                .set_json(serde_json::json!({ "optionIndex": 1 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["options"][0]["votes"], 0);
        assert_eq!(body["options"][1]["votes"], 1);
        assert_eq!(body["options"][2]["votes"], 0);
    }

    #[rstest]
    #[case(serde_json::json!({ "optionIndex": 3 }))]
    #[case(serde_json::json!({ "optionIndex": -1 }))]
    #[case(serde_json::json!({}))]
    #[actix_web::test]
    async fn invalid_votes_change_no_tallies(#[case] vote_body: Value) {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;
        let admin = login_admin(&app, &harness.state).await;
        let id = create_poll_via_api(&app, &admin).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/polls/{id}/vote"))
                .cookie(resident.clone())
                .set_json(vote_body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/polls/{id}"))
                .cookie(resident)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        let total: u64 = body["options"]
            .as_array()
            .expect("options")
            .iter()
            .map(|o| o["votes"].as_u64().expect("votes"))
            .sum();
        assert_eq!(total, 0);
    }

    #[rstest]
    #[actix_web::test]
    async fn poll_creation_is_admin_only() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);
        let resident = signup_resident(&app, "a-101", "asha@example.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/polls")
                .cookie(resident)
                .set_json(poll_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn delete_then_fetch_is_not_found() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state.clone());
        let admin = login_admin(&app, &harness.state).await;
        let id = create_poll_via_api(&app, &admin).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/polls/{id}"))
                .cookie(admin.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/polls/{id}"))
                .cookie(admin)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
