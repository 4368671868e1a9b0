//! Wiring of domain services to their adapters.
//!
//! With a database pool configured, every repository port gets its Diesel
//! adapter; otherwise a shared [`MemoryStore`] backs them all. The notifier
//! falls back to the log-only adapter when no gateway is configured.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::warn;

use backend::domain::memory::MemoryStore;
use backend::domain::ports::{
    AccountRepository, BookingRepository, BulletinRepository, DueRepository, GuestPassRepository,
    MarketplaceRepository, OtpNotifier, PollRepository, TicketRepository,
};
use backend::domain::{
    AuthService, BookingService, BulletinService, DuesService, GuestPassService,
    MarketplaceService, PollService, TicketService,
};
use backend::inbound::http::state::HttpState;
use backend::outbound::notify::{HttpSmsNotifier, LogNotifier};
use backend::outbound::password::Argon2Vault;
use backend::outbound::persistence::{
    DieselAccountRepository, DieselBookingRepository, DieselBulletinRepository,
    DieselDueRepository, DieselGuestPassRepository, DieselMarketplaceRepository,
    DieselPollRepository, DieselTicketRepository,
};
use backend::outbound::uploads::UploadStore;

use super::ServerConfig;

struct Repositories {
    accounts: Arc<dyn AccountRepository>,
    dues: Arc<dyn DueRepository>,
    bookings: Arc<dyn BookingRepository>,
    guest_passes: Arc<dyn GuestPassRepository>,
    tickets: Arc<dyn TicketRepository>,
    polls: Arc<dyn PollRepository>,
    marketplace: Arc<dyn MarketplaceRepository>,
    bulletins: Arc<dyn BulletinRepository>,
}

fn build_repositories(config: &ServerConfig) -> Repositories {
    match &config.db_pool {
        Some(pool) => Repositories {
            accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
            dues: Arc::new(DieselDueRepository::new(pool.clone())),
            bookings: Arc::new(DieselBookingRepository::new(pool.clone())),
            guest_passes: Arc::new(DieselGuestPassRepository::new(pool.clone())),
            tickets: Arc::new(DieselTicketRepository::new(pool.clone())),
            polls: Arc::new(DieselPollRepository::new(pool.clone())),
            marketplace: Arc::new(DieselMarketplaceRepository::new(pool.clone())),
            bulletins: Arc::new(DieselBulletinRepository::new(pool.clone())),
        },
        None => {
            warn!("no database configured; falling back to in-memory storage");
            let store = Arc::new(MemoryStore::new());
            Repositories {
                accounts: store.clone(),
                dues: store.clone(),
                bookings: store.clone(),
                guest_passes: store.clone(),
                tickets: store.clone(),
                polls: store.clone(),
                marketplace: store.clone(),
                bulletins: store,
            }
        }
    }
}

fn build_notifier(config: &ServerConfig) -> std::io::Result<Arc<dyn OtpNotifier>> {
    match &config.sms_gateway {
        Some(gateway) => {
            let notifier = HttpSmsNotifier::new(gateway.endpoint.clone(), gateway.api_key.clone())
                .map_err(|err| std::io::Error::other(format!("sms gateway setup failed: {err}")))?;
            Ok(Arc::new(notifier))
        }
        None => {
            warn!("no SMS gateway configured; OTP codes will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

/// Assemble the HTTP dependency bundle from configuration.
pub fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let repos = build_repositories(config);
    let notifier = build_notifier(config)?;
    let vault = Arc::new(Argon2Vault::new());
    let clock = || Arc::new(DefaultClock) as Arc<dyn mockable::Clock>;

    let uploads = UploadStore::open(&config.uploads_dir, "/uploads")
        .map_err(|err| std::io::Error::other(format!("uploads directory setup failed: {err}")))?;

    Ok(HttpState {
        auth: Arc::new(AuthService::new(repos.accounts.clone(), vault)),
        dues: Arc::new(DuesService::new(
            repos.dues,
            repos.accounts.clone(),
            clock(),
        )),
        bookings: Arc::new(BookingService::new(repos.bookings, clock())),
        guest_passes: Arc::new(GuestPassService::new(repos.guest_passes, clock())),
        tickets: Arc::new(TicketService::new(
            repos.tickets,
            repos.accounts,
            notifier,
            clock(),
        )),
        polls: Arc::new(PollService::new(repos.polls, clock())),
        marketplace: Arc::new(MarketplaceService::new(repos.marketplace, clock())),
        bulletins: Arc::new(BulletinService::new(repos.bulletins, clock())),
        uploads: Arc::new(uploads),
    })
}
