//! PostgreSQL-backed `BookingRepository` implementation using Diesel.
//!
//! The overlap probe encodes the half-open predicate directly:
//! `start_time < requested.end AND end_time > requested.start`, restricted to
//! slot-holding statuses. The composite (amenity_name, start_time, end_time)
//! index keeps it cheap at this record volume.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingWindow, BookingWithOwner};
use crate::domain::ports::{BookingRepository, StoreError};
use crate::domain::principal::ResidentId;

use super::models::BookingRow;
use super::pool::DbPool;
use super::schema::{bookings, residents};
use super::{map_diesel_error, map_pool_error};

/// Statuses that hold a slot, in their persisted form. Must stay in sync
/// with [`BookingStatus::holds_slot`].
const SLOT_HOLDING: [&str; 2] = ["Pending", "Approved"];

fn row_to_booking(row: BookingRow) -> Result<Booking, StoreError> {
    Booking::try_from(row).map_err(|err| StoreError::query(format!("corrupt booking row: {err}")))
}

fn joined_to_booking(
    (row, owner_name, owner_login_id): (BookingRow, String, String),
) -> Result<BookingWithOwner, StoreError> {
    Ok(BookingWithOwner {
        booking: row_to_booking(row)?,
        owner_name,
        owner_login_id: crate::domain::LoginId::new(owner_login_id)
            .map_err(|err| StoreError::query(format!("corrupt login id: {err}")))?,
    })
}

/// Diesel-backed implementation of the `BookingRepository` port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(bookings::table)
            .values(BookingRow::from(booking))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BookingRow> = bookings::table
            .find(id)
            .select(BookingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_booking).transpose()
    }

    async fn update(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(bookings::table.find(booking.id))
            .set(BookingRow::from(booking))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(bookings::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_for_resident(
        &self,
        resident_id: ResidentId,
    ) -> Result<Vec<Booking>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BookingRow> = bookings::table
            .filter(bookings::resident_id.eq(resident_id.as_uuid()))
            .order(bookings::start_time.desc())
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_booking).collect()
    }

    async fn list_all(&self) -> Result<Vec<BookingWithOwner>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(BookingRow, String, String)> = bookings::table
            .inner_join(residents::table)
            .order(bookings::start_time.desc())
            .select((
                BookingRow::as_select(),
                residents::name,
                residents::login_id,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(joined_to_booking).collect()
    }

    async fn find_with_owner(&self, id: Uuid) -> Result<Option<BookingWithOwner>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(BookingRow, String, String)> = bookings::table
            .inner_join(residents::table)
            .filter(bookings::id.eq(id))
            .select((
                BookingRow::as_select(),
                residents::name,
                residents::login_id,
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(joined_to_booking).transpose()
    }

    async fn any_active_overlap(
        &self,
        amenity_name: &str,
        window: &BookingWindow,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = bookings::table
            .filter(bookings::amenity_name.eq(amenity_name))
            .filter(bookings::status.eq_any(SLOT_HOLDING))
            .filter(bookings::start_time.lt(window.end()))
            .filter(bookings::end_time.gt(window.start()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count > 0)
    }
}
