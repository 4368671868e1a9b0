//! Backend entry-point: configuration, migrations, admin seeding, serving.

mod server;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::LoginId;
use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig};
use server::{ServerConfig, SmsGatewayConfig, build_http_state, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let db_pool = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            run_migrations(database_url.clone()).await?;
            let pool = DbPool::connect(PoolConfig::new(database_url))
                .await
                .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
            Some(pool)
        }
        Err(_) => None,
    };

    let sms_gateway = match (env::var("SMS_GATEWAY_URL"), env::var("SMS_GATEWAY_API_KEY")) {
        (Ok(endpoint), Ok(api_key)) => Some(SmsGatewayConfig { endpoint, api_key }),
        _ => None,
    };

    let uploads_dir =
        PathBuf::from(env::var("UPLOADS_DIR").unwrap_or_else(|_| "public/uploads".into()));

    let mut config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr)
        .with_sms_gateway(sms_gateway)
        .with_uploads_dir(uploads_dir);
    if let Some(pool) = db_pool {
        config = config.with_db_pool(pool);
    }

    let http_state = build_http_state(&config)?;
    seed_default_admin(&http_state).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config, http_state)?;
    info!(%bind_addr, "server started");
    server.await
}

/// Load the session signing key, tolerating a missing file only in
/// development.
fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

/// Apply pending migrations over a blocking connection before serving.
async fn run_migrations(database_url: String) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || {
        let mut conn = diesel::pg::PgConnection::establish(&database_url)
            .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
        Ok::<_, std::io::Error>(())
    })
    .await
    .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
}

/// Idempotent startup step creating the bootstrap admin account.
async fn seed_default_admin(state: &backend::inbound::http::state::HttpState) -> std::io::Result<()> {
    let login_id = env::var("ADMIN_LOGIN_ID").unwrap_or_else(|_| "admin".into());
    let login_id = LoginId::new(login_id)
        .map_err(|e| std::io::Error::other(format!("invalid ADMIN_LOGIN_ID: {e}")))?;
    let password = match env::var("ADMIN_BOOTSTRAP_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            warn!("ADMIN_BOOTSTRAP_PASSWORD not set; using the development default");
            "Admin@123".to_owned()
        }
    };
    state
        .auth
        .ensure_default_admin(&login_id, &password)
        .await
        .map_err(|e| std::io::Error::other(format!("admin seeding failed: {e}")))
}
