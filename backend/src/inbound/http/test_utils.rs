//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;
use tempfile::TempDir;

use crate::domain::memory::{MemoryStore, RecordingNotifier};
use crate::domain::test_support::plain_vault;
use crate::domain::{
    AuthService, BookingService, BulletinService, DuesService, GuestPassService,
    MarketplaceService, PollService, TicketService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::uploads::UploadStore;

/// Build the full application over the given state for handler tests.
///
/// Expands in place so each test owns its concretely typed service.
#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap($crate::inbound::http::test_utils::test_session_middleware())
                .service(
                    actix_web::web::scope("/api/v1")
                        .configure($crate::inbound::http::routes::configure),
                ),
        )
        .await
    };
}

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The instant every handler test's mock clock reports.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 10, 8, 0, 0)
        .single()
        .expect("valid fixture instant")
}

/// Everything a handler test needs: state over in-memory adapters plus
/// handles to observe side effects.
pub struct TestHarness {
    pub state: HttpState,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    // Held so the uploads directory outlives the test.
    _uploads_dir: TempDir,
}

/// Build an [`HttpState`] over a fresh [`MemoryStore`] with a clock pinned to
/// [`fixture_now`].
pub fn memory_state() -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let vault = plain_vault();

    let clock = || {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(fixture_now);
        Arc::new(clock) as Arc<dyn mockable::Clock>
    };

    let uploads_dir = tempfile::tempdir().expect("uploads temp dir");
    let uploads =
        Arc::new(UploadStore::open(uploads_dir.path(), "/uploads").expect("open upload store"));

    let state = HttpState {
        auth: Arc::new(AuthService::new(store.clone(), vault)),
        dues: Arc::new(DuesService::new(store.clone(), store.clone(), clock())),
        bookings: Arc::new(BookingService::new(store.clone(), clock())),
        guest_passes: Arc::new(GuestPassService::new(store.clone(), clock())),
        tickets: Arc::new(TicketService::new(
            store.clone(),
            store.clone(),
            notifier.clone(),
            clock(),
        )),
        polls: Arc::new(PollService::new(store.clone(), clock())),
        marketplace: Arc::new(MarketplaceService::new(store.clone(), clock())),
        bulletins: Arc::new(BulletinService::new(store.clone(), clock())),
        uploads,
    };

    TestHarness {
        state,
        store,
        notifier,
        _uploads_dir: uploads_dir,
    }
}

/// Sign up a resident through the API and return their session cookie.
pub async fn signup_resident(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    login_id: &str,
    email: &str,
) -> actix_web::cookie::Cookie<'static> {
    let res = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(serde_json::json!({
                "name": "Asha Rao",
                "email": email,
                "loginId": login_id,
                "phone": "+911234567890",
                "password": "secret-password",
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "signup failed: {}", res.status());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Seed the default admin and log in through the API, returning the cookie.
pub async fn login_admin(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    state: &HttpState,
) -> actix_web::cookie::Cookie<'static> {
    let login_id = crate::domain::LoginId::new("admin").expect("admin login id");
    state
        .auth
        .ensure_default_admin(&login_id, "Admin@123")
        .await
        .expect("seed default admin");

    let res = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(serde_json::json!({
                "loginId": "admin",
                "password": "Admin@123",
                "role": "admin",
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "admin login failed: {}", res.status());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
