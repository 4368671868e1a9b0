//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the domain services and remain testable without I/O: tests build the
//! same bundle over in-memory adapters.

use std::sync::Arc;

use crate::domain::{
    AuthService, BookingService, BulletinService, DuesService, GuestPassService,
    MarketplaceService, PollService, TicketService,
};
use crate::outbound::uploads::UploadStore;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<AuthService>,
    pub dues: Arc<DuesService>,
    pub bookings: Arc<BookingService>,
    pub guest_passes: Arc<GuestPassService>,
    pub tickets: Arc<TicketService>,
    pub polls: Arc<PollService>,
    pub marketplace: Arc<MarketplaceService>,
    pub bulletins: Arc<BulletinService>,
    pub uploads: Arc<UploadStore>,
}
