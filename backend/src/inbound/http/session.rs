//! Session helpers keeping HTTP handlers free of framework-specific logic.
//!
//! A thin wrapper around Actix sessions so handlers only deal with the
//! domain-level [`Principal`]. The signed cookie with its one-hour TTL is the
//! session token; signing and verification are the session middleware's
//! concern.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AdminId, Error, Principal, ResidentId};

pub(crate) const PRINCIPAL_KEY: &str = "principal";

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated principal in the session cookie.
    pub fn persist(&self, principal: Principal) -> Result<(), Error> {
        self.0
            .insert(PRINCIPAL_KEY, principal)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the session, logging the caller out.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Fetch the current principal from the session, if present.
    ///
    /// A tampered or stale payload is treated as no session rather than an
    /// internal error.
    pub fn principal(&self) -> Result<Option<Principal>, Error> {
        match self.0.get::<Principal>(PRINCIPAL_KEY) {
            Ok(principal) => Ok(principal),
            Err(error) => {
                tracing::warn!("invalid principal in session cookie: {error}");
                Ok(None)
            }
        }
    }

    /// Require any authenticated principal.
    pub fn require_principal(&self) -> Result<Principal, Error> {
        self.principal()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require a resident session or return `401 Unauthorized`.
    pub fn require_resident(&self) -> Result<ResidentId, Error> {
        self.require_principal()?
            .as_resident()
            .ok_or_else(|| Error::unauthorized("resident login required"))
    }

    /// Require an admin session or return `401 Unauthorized`.
    pub fn require_admin(&self) -> Result<AdminId, Error> {
        self.require_principal()?
            .as_admin()
            .ok_or_else(|| Error::unauthorized("admin login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::inbound::http::test_utils::test_session_middleware;

    #[actix_web::test]
    async fn round_trips_principal() {
        let resident = ResidentId::random();
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(move |session: SessionContext| async move {
                        session.persist(Principal::Resident(resident))?;
                        Ok::<_, crate::inbound::http::ApiError>(HttpResponse::Ok().finish())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let id = session.require_resident()?;
                        Ok::<_, crate::inbound::http::ApiError>(
                            HttpResponse::Ok().body(id.to_string()),
                        )
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set");

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/get")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, resident.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn missing_session_is_unauthorised() {
        let app = test::init_service(App::new().wrap(test_session_middleware()).route(
            "/require",
            web::get().to(|session: SessionContext| async move {
                let _ = session.require_admin()?;
                Ok::<_, crate::inbound::http::ApiError>(HttpResponse::Ok().finish())
            }),
        ))
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn resident_session_cannot_pass_admin_gate() {
        let resident = ResidentId::random();
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/login",
                    web::get().to(move |session: SessionContext| async move {
                        session.persist(Principal::Resident(resident))?;
                        Ok::<_, crate::inbound::http::ApiError>(HttpResponse::Ok().finish())
                    }),
                )
                .route(
                    "/admin-only",
                    web::get().to(|session: SessionContext| async move {
                        let _ = session.require_admin()?;
                        Ok::<_, crate::inbound::http::ApiError>(HttpResponse::Ok().finish())
                    }),
                ),
        )
        .await;

        let login =
            test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = login
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin-only")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tampered_principal_is_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(PRINCIPAL_KEY, "not-a-principal")
                            .expect("set invalid principal");
                        HttpResponse::Ok().finish()
                    }),
                )
                .route(
                    "/require",
                    web::get().to(|session: SessionContext| async move {
                        let _ = session.require_resident()?;
                        Ok::<_, crate::inbound::http::ApiError>(HttpResponse::Ok().finish())
                    }),
                ),
        )
        .await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/require")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
