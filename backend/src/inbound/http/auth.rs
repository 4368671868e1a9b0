//! Authentication and account handlers.
//!
//! ```text
//! POST /api/v1/auth/signup   {"name":"…","email":"…","loginId":"…","password":"…"}
//! POST /api/v1/auth/login    {"loginId":"…","password":"…","role":"resident"}
//! POST /api/v1/auth/logout
//! GET  /api/v1/profile
//! GET  /api/v1/admin/residents
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    AuthValidationError, Error, LoginCredentials, Principal, Resident, SignupRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Signup request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupDto {
    pub name: String,
    pub email: String,
    pub login_id: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    pub login_id: String,
    pub password: String,
    pub role: String,
}

/// Public account fields returned after authentication.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserDto {
    pub id: String,
    pub name: String,
    pub login_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Session establishment response.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub role: String,
    pub user: PublicUserDto,
}

/// Resident directory entry for the admin view.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResidentDto {
    pub id: String,
    pub name: String,
    pub login_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: String,
}

impl From<Resident> for ResidentDto {
    fn from(resident: Resident) -> Self {
        Self {
            id: resident.id.to_string(),
            name: resident.name,
            login_id: resident.login_id.into(),
            email: resident.email.into(),
            phone: resident.phone,
            created_at: resident.created_at.to_rfc3339(),
        }
    }
}

fn map_auth_validation_error(err: AuthValidationError) -> Error {
    let field = match &err {
        AuthValidationError::Account(_) => "loginId/email/name",
        AuthValidationError::EmptyPassword | AuthValidationError::PasswordTooShort { .. } => {
            "password"
        }
        AuthValidationError::UnknownKind => "role",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Register a new resident and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupDto,
    responses(
        (status = 201, description = "Account created", body = SessionDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError),
        (status = 409, description = "Login id or email already in use", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignupDto>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let request = SignupRequest::try_from_parts(
        &payload.name,
        &payload.email,
        &payload.login_id,
        payload.phone.as_deref(),
        &payload.password,
    )
    .map_err(map_auth_validation_error)?;

    let resident = state.auth.signup(request).await?;
    session.persist(Principal::Resident(resident.id))?;

    Ok(HttpResponse::Created().json(SessionDto {
        role: "resident".to_owned(),
        user: PublicUserDto {
            id: resident.id.to_string(),
            name: resident.name,
            login_id: resident.login_id.into(),
            email: Some(resident.email.into()),
        },
    }))
}

/// Authenticate a resident or admin and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login success", body = SessionDto),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError),
        (status = 401, description = "Invalid credentials", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginDto>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&payload.login_id, &payload.password, &payload.role)
            .map_err(map_auth_validation_error)?;

    let user = state.auth.login(&credentials).await?;
    session.persist(user.principal)?;

    Ok(HttpResponse::Ok().json(SessionDto {
        role: user.principal.kind().to_string(),
        user: PublicUserDto {
            id: match user.principal {
                Principal::Resident(id) => id.to_string(),
                Principal::Admin(id) => id.to_string(),
            },
            name: user.name,
            login_id: user.login_id.into(),
            email: user.email,
        },
    }))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

/// The calling resident's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = ResidentDto),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["auth"],
    operation_id = "profile"
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ResidentDto>> {
    let resident_id = session.require_resident()?;
    // Re-fetch so a deleted account invalidates its surviving sessions.
    let resident = state.auth.current_resident(resident_id).await?;
    Ok(web::Json(resident.into()))
}

/// Admin directory of all residents.
#[utoipa::path(
    get,
    path = "/api/v1/admin/residents",
    responses(
        (status = 200, description = "Residents", body = [ResidentDto]),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["auth"],
    operation_id = "listResidents"
)]
#[get("/admin/residents")]
pub async fn list_residents(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ResidentDto>>> {
    session.require_admin()?;
    let residents = state.auth.list_residents().await?;
    Ok(web::Json(residents.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::memory_state;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    fn signup_body(login_id: &str, email: &str) -> Value {
        serde_json::json!({
            "name": "Asha Rao",
            "email": email,
            "loginId": login_id,
            "password": "secret-password",
        })
    }

    #[rstest]
    #[actix_web::test]
    async fn signup_returns_created_with_session_cookie() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(signup_body("a-101", "asha@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert!(
            res.response()
                .cookies()
                .any(|cookie| cookie.name() == "session")
        );
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["role"], "resident");
        assert_eq!(body["user"]["loginId"], "a-101");
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_signup_conflicts() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);

        let first = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(signup_body("a-101", "asha@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(signup_body("a-101", "different@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[actix_web::test]
    async fn login_round_trip_and_profile() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(signup_body("a-101", "asha@example.com"))
                .to_request(),
        )
        .await;

        let login_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(serde_json::json!({
                    "loginId": "a-101",
                    "password": "secret-password",
                    "role": "resident",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let cookie = login_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();

        let profile_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/profile")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(profile_res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(profile_res).await;
        assert_eq!(body["loginId"], "a-101");
        assert_eq!(body["email"], "asha@example.com");
    }

    #[rstest]
    #[actix_web::test]
    async fn wrong_credentials_are_unauthorised() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(signup_body("a-101", "asha@example.com"))
                .to_request(),
        )
        .await;

        let login_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(serde_json::json!({
                    "loginId": "a-101",
                    "password": "wrong",
                    "role": "resident",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(login_res).await;
        assert_eq!(body["code"], "unauthorized");
    }

    #[rstest]
    #[actix_web::test]
    async fn profile_requires_session() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/profile")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_role_is_a_bad_request() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(serde_json::json!({
                    "loginId": "a-101",
                    "password": "pw",
                    "role": "superuser",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "role");
    }
}
