//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the strongly typed entities and business rules used by the
//! HTTP and persistence layers. Types stay transport agnostic; invariants and
//! serialisation contracts are documented on each type.

pub mod account;
pub mod auth;
pub mod auth_service;
pub mod booking;
pub mod booking_service;
pub mod bulletin;
pub mod bulletin_service;
pub mod due;
pub mod dues_service;
pub mod error;
pub mod guest_pass;
pub mod guest_pass_service;
pub mod marketplace;
pub mod marketplace_service;
pub mod memory;
pub mod poll;
pub mod poll_service;
pub mod ports;
pub mod principal;
#[cfg(test)]
pub mod test_support;
pub mod ticket;
pub mod ticket_service;

pub use self::account::{Admin, EmailAddress, LoginId, Resident};
pub use self::auth::{AuthValidationError, LoginCredentials, SignupRequest};
pub use self::auth_service::{AuthService, AuthenticatedUser};
pub use self::booking::{
    AMENITIES, Amenity, Booking, BookingStatus, BookingWindow, BookingWithOwner,
};
pub use self::booking_service::{BookingService, NewBooking};
pub use self::bulletin::{Expense, MaintenanceTask, Notice, TaskStatus};
pub use self::bulletin_service::BulletinService;
pub use self::due::{CurrentDue, Due, DueStatus, DueWithOwner};
pub use self::dues_service::{DashboardStats, DuesService, NewDue};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::guest_pass::{GuestPass, GuestPassStatus, GuestPassWithNames};
pub use self::guest_pass_service::{GuestPassService, NewGuestPass};
pub use self::marketplace::{ItemStatus, ItemWithSeller, ListingPatch, MarketplaceItem};
pub use self::marketplace_service::{MarketplaceService, NewListing};
pub use self::poll::{Poll, PollOption};
pub use self::poll_service::PollService;
pub use self::principal::{AdminId, Principal, PrincipalKind, ResidentId};
pub use self::ticket::{
    Ticket, TicketCategory, TicketOverview, TicketPriority, TicketStatus, TicketWithOwner,
};
pub use self::ticket_service::{NewTicket, TicketService};

/// Convenient domain result alias.
pub type DomainResult<T> = Result<T, Error>;
