//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use backend::outbound::persistence::DbPool;

/// Connection details for the SMS/WhatsApp gateway.
#[derive(Clone)]
pub struct SmsGatewayConfig {
    pub endpoint: String,
    pub api_key: String,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) sms_gateway: Option<SmsGatewayConfig>,
    pub(crate) uploads_dir: PathBuf,
}

impl ServerConfig {
    /// Construct a server configuration with no optional collaborators.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            sms_gateway: None,
            uploads_dir: PathBuf::from("public/uploads"),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one, the server runs on in-memory adapters and loses all
    /// state on restart (development mode).
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the SMS gateway used for OTP delivery.
    #[must_use]
    pub fn with_sms_gateway(mut self, gateway: Option<SmsGatewayConfig>) -> Self {
        self.sms_gateway = gateway;
        self
    }

    /// Override the uploads directory.
    #[must_use]
    pub fn with_uploads_dir(mut self, dir: PathBuf) -> Self {
        self.uploads_dir = dir;
        self
    }
}
