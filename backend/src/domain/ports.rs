//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (database repositories, the password hasher, the out-of-band notifier).
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::account::{Admin, EmailAddress, LoginId, Resident};
use super::error::Error;
use super::booking::{Booking, BookingWindow, BookingWithOwner};
use super::bulletin::{Expense, MaintenanceTask, Notice};
use super::due::{Due, DueStatusCounts, DueWithOwner};
use super::guest_pass::{GuestPass, GuestPassWithNames};
use super::marketplace::{ItemWithSeller, MarketplaceItem};
use super::poll::Poll;
use super::principal::{AdminId, ResidentId};
use super::ticket::{Ticket, TicketOverview, TicketWithOwner};

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Connection could not be established or was lost mid-operation.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("store query failed: {message}")]
    Query { message: String },
    /// A uniqueness constraint rejected the write.
    #[error("duplicate value for {field}")]
    Duplicate { field: String },
}

impl StoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for uniqueness violations.
    pub fn duplicate(field: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
        }
    }
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Connection { message } => {
                Self::service_unavailable(format!("store unavailable: {message}"))
            }
            StoreError::Query { message } => Self::internal(format!("store error: {message}")),
            StoreError::Duplicate { field } => Self::conflict(format!("duplicate value for {field}")),
        }
    }
}

/// Errors surfaced by the out-of-band notifier adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// Gateway unreachable or timing out.
    #[error("notifier unavailable: {message}")]
    Unavailable { message: String },
    /// Gateway accepted the connection but rejected the message.
    #[error("notifier rejected message: {message}")]
    Rejected { message: String },
}

impl NotifyError {
    /// Helper for gateway outages.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Helper for rejected messages.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

impl From<NotifyError> for Error {
    fn from(error: NotifyError) -> Self {
        // Gateway internals stay out of client-facing messages.
        tracing::warn!(error = %error, "otp delivery failed");
        Self::service_unavailable("could not deliver the confirmation code")
    }
}

/// Errors surfaced by the password hashing adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("password hashing failed: {message}")]
pub struct VaultError {
    pub message: String,
}

impl VaultError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<VaultError> for Error {
    fn from(error: VaultError) -> Self {
        Self::internal(format!("credential processing failed: {}", error.message))
    }
}

/// One-way password hashing and verification.
///
/// Hash format is adapter-defined (PHC string for the argon2 adapter).
/// Verification must not distinguish "bad hash" from "wrong password" to the
/// caller beyond the boolean result.
pub trait PasswordVault: Send + Sync {
    /// Hash a raw password for storage.
    fn hash_password(&self, raw: &str) -> Result<String, VaultError>;

    /// Check a raw password against a stored hash.
    fn verify_password(&self, raw: &str, stored: &str) -> Result<bool, VaultError>;
}

/// Out-of-band delivery of ticket-closure codes.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    /// Deliver `code` to the resident's contact address or number.
    async fn deliver(&self, recipient: &str, code: &str) -> Result<(), NotifyError>;
}

/// Persistence port for resident and admin accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new resident; `Duplicate` when login id or email is taken.
    async fn insert_resident(&self, resident: &Resident) -> Result<(), StoreError>;

    /// Fetch a resident by identifier.
    async fn find_resident(&self, id: ResidentId) -> Result<Option<Resident>, StoreError>;

    /// Fetch a resident by login id.
    async fn find_resident_by_login(&self, login_id: &LoginId)
    -> Result<Option<Resident>, StoreError>;

    /// True when a resident already uses the login id or the email.
    async fn resident_exists(
        &self,
        login_id: &LoginId,
        email: &EmailAddress,
    ) -> Result<bool, StoreError>;

    /// All residents, newest first.
    async fn list_residents(&self) -> Result<Vec<Resident>, StoreError>;

    /// Number of registered residents.
    async fn count_residents(&self) -> Result<u64, StoreError>;

    /// Insert a new admin; `Duplicate` when the admin login id is taken.
    async fn insert_admin(&self, admin: &Admin) -> Result<(), StoreError>;

    /// Fetch an admin by identifier.
    async fn find_admin(&self, id: AdminId) -> Result<Option<Admin>, StoreError>;

    /// Fetch an admin by login id.
    async fn find_admin_by_login(&self, login_id: &LoginId) -> Result<Option<Admin>, StoreError>;
}

/// Persistence port for the dues ledger.
#[async_trait]
pub trait DueRepository: Send + Sync {
    async fn insert(&self, due: &Due) -> Result<(), StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Due>, StoreError>;

    async fn update(&self, due: &Due) -> Result<(), StoreError>;

    /// All dues joined with owner display fields, newest due date first.
    async fn list_all(&self) -> Result<Vec<DueWithOwner>, StoreError>;

    /// A single due joined with owner display fields.
    async fn find_with_owner(&self, id: Uuid) -> Result<Option<DueWithOwner>, StoreError>;

    /// The outstanding due with the earliest due date for a resident.
    async fn earliest_outstanding(
        &self,
        resident_id: ResidentId,
    ) -> Result<Option<Due>, StoreError>;

    /// Ledger counters for the dashboard.
    async fn status_counts(&self) -> Result<DueStatusCounts, StoreError>;
}

/// Persistence port for amenity bookings.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    async fn update(&self, booking: &Booking) -> Result<(), StoreError>;

    /// Remove a booking entirely; returns whether a record existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// A resident's own bookings, latest start first.
    async fn list_for_resident(&self, resident_id: ResidentId)
    -> Result<Vec<Booking>, StoreError>;

    /// All bookings joined with owner display fields, latest start first.
    async fn list_all(&self) -> Result<Vec<BookingWithOwner>, StoreError>;

    /// A single booking joined with owner display fields.
    async fn find_with_owner(&self, id: Uuid) -> Result<Option<BookingWithOwner>, StoreError>;

    /// True when any Pending/Approved booking for `amenity_name` overlaps
    /// `window` under half-open semantics.
    async fn any_active_overlap(
        &self,
        amenity_name: &str,
        window: &BookingWindow,
    ) -> Result<bool, StoreError>;
}

/// Persistence port for guest passes.
#[async_trait]
pub trait GuestPassRepository: Send + Sync {
    async fn insert(&self, pass: &GuestPass) -> Result<(), StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<GuestPass>, StoreError>;

    /// Persist a state change; `Duplicate` when an assigned code collides.
    async fn update(&self, pass: &GuestPass) -> Result<(), StoreError>;

    /// A resident's own passes, latest visit first.
    async fn list_for_resident(
        &self,
        resident_id: ResidentId,
    ) -> Result<Vec<GuestPassWithNames>, StoreError>;

    /// All passes, newest request first.
    async fn list_all(&self) -> Result<Vec<GuestPassWithNames>, StoreError>;

    /// A single pass joined with requester and handler display fields.
    async fn find_with_names(&self, id: Uuid) -> Result<Option<GuestPassWithNames>, StoreError>;
}

/// Persistence port for support tickets.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn insert(&self, ticket: &Ticket) -> Result<(), StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Ticket>, StoreError>;

    async fn update(&self, ticket: &Ticket) -> Result<(), StoreError>;

    /// A resident's own tickets, newest first.
    async fn list_for_resident(&self, resident_id: ResidentId) -> Result<Vec<Ticket>, StoreError>;

    /// All tickets joined with owner display fields, newest first.
    async fn list_all(&self) -> Result<Vec<TicketWithOwner>, StoreError>;

    /// Dashboard counters over the collection.
    async fn overview(&self) -> Result<TicketOverview, StoreError>;

    /// Unclosed tickets whose SLA target passed before `now`.
    async fn sla_breaches(&self, now: DateTime<Utc>) -> Result<Vec<TicketWithOwner>, StoreError>;
}

/// Persistence port for polls.
#[async_trait]
pub trait PollRepository: Send + Sync {
    async fn insert(&self, poll: &Poll) -> Result<(), StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Poll>, StoreError>;

    /// All polls, newest first.
    async fn list_all(&self) -> Result<Vec<Poll>, StoreError>;

    /// Remove a poll and its options; returns whether a record existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Increment one option's tally by exactly one and return the updated
    /// poll. The caller has already bounds-checked `option_index`.
    async fn record_vote(&self, poll_id: Uuid, option_index: usize)
    -> Result<Option<Poll>, StoreError>;
}

/// Persistence port for marketplace listings.
#[async_trait]
pub trait MarketplaceRepository: Send + Sync {
    async fn insert(&self, item: &MarketplaceItem) -> Result<(), StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<MarketplaceItem>, StoreError>;

    async fn update(&self, item: &MarketplaceItem) -> Result<(), StoreError>;

    /// Remove a listing; returns whether a record existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Available listings joined with seller display fields, newest first.
    async fn list_available(&self) -> Result<Vec<ItemWithSeller>, StoreError>;

    /// One seller's listings, newest first.
    async fn list_for_seller(
        &self,
        seller_id: ResidentId,
    ) -> Result<Vec<MarketplaceItem>, StoreError>;

    /// A single listing joined with seller display fields.
    async fn find_with_seller(&self, id: Uuid) -> Result<Option<ItemWithSeller>, StoreError>;
}

/// Persistence port for notices, maintenance tasks, and expenses.
#[async_trait]
pub trait BulletinRepository: Send + Sync {
    async fn insert_notice(&self, notice: &Notice) -> Result<(), StoreError>;

    /// All notices, newest first.
    async fn list_notices(&self) -> Result<Vec<Notice>, StoreError>;

    async fn insert_task(&self, task: &MaintenanceTask) -> Result<(), StoreError>;

    async fn find_task(&self, id: Uuid) -> Result<Option<MaintenanceTask>, StoreError>;

    async fn update_task(&self, task: &MaintenanceTask) -> Result<(), StoreError>;

    /// All tasks, latest scheduled date first.
    async fn list_tasks(&self) -> Result<Vec<MaintenanceTask>, StoreError>;

    async fn insert_expense(&self, expense: &Expense) -> Result<(), StoreError>;

    /// All expenses, latest spend date first.
    async fn list_expenses(&self) -> Result<Vec<Expense>, StoreError>;
}
