//! PostgreSQL persistence adapters behind the domain repository ports.

pub mod models;
pub mod pool;
pub mod schema;

mod diesel_account_repository;
mod diesel_booking_repository;
mod diesel_bulletin_repository;
mod diesel_due_repository;
mod diesel_guest_pass_repository;
mod diesel_marketplace_repository;
mod diesel_poll_repository;
mod diesel_ticket_repository;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_bulletin_repository::DieselBulletinRepository;
pub use diesel_due_repository::DieselDueRepository;
pub use diesel_guest_pass_repository::DieselGuestPassRepository;
pub use diesel_marketplace_repository::DieselMarketplaceRepository;
pub use diesel_poll_repository::DieselPollRepository;
pub use diesel_ticket_repository::DieselTicketRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

use crate::domain::ports::StoreError;
use tracing::debug;

/// Map pool errors to the shared store error.
pub(crate) fn map_pool_error(error: PoolError) -> StoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreError::connection(message)
        }
    }
}

/// Map Diesel errors to the shared store error.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> StoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StoreError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreError::duplicate(info.constraint_name().unwrap_or("unique constraint").to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => StoreError::query("database error"),
        _ => StoreError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(repo_err, StoreError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(repo_err, StoreError::Query { .. }));
        assert!(repo_err.to_string().contains("record not found"));
    }
}
