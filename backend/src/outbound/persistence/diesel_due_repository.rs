//! PostgreSQL-backed `DueRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::account::LoginId;
use crate::domain::due::{Due, DueStatusCounts, DueWithOwner};
use crate::domain::ports::{DueRepository, StoreError};
use crate::domain::principal::ResidentId;

use super::models::DueRow;
use super::pool::DbPool;
use super::schema::{dues, residents};
use super::{map_diesel_error, map_pool_error};

/// Outstanding statuses in their persisted form. Must stay in sync with
/// [`crate::domain::DueStatus::outstanding`].
const OUTSTANDING: [&str; 2] = ["Pending", "Overdue"];

fn joined_to_due(
    (row, owner_name, owner_login_id): (DueRow, String, String),
) -> Result<DueWithOwner, StoreError> {
    Ok(DueWithOwner {
        due: row.into(),
        owner_name,
        owner_login_id: LoginId::new(owner_login_id)
            .map_err(|err| StoreError::query(format!("corrupt login id: {err}")))?,
    })
}

/// Diesel-backed implementation of the `DueRepository` port.
#[derive(Clone)]
pub struct DieselDueRepository {
    pool: DbPool,
}

impl DieselDueRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DueRepository for DieselDueRepository {
    async fn insert(&self, due: &Due) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(dues::table)
            .values(DueRow::from(due))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Due>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DueRow> = dues::table
            .find(id)
            .select(DueRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn update(&self, due: &Due) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(dues::table.find(due.id))
            .set(DueRow::from(due))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_all(&self) -> Result<Vec<DueWithOwner>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(DueRow, String, String)> = dues::table
            .inner_join(residents::table)
            .order(dues::due_date.desc())
            .select((DueRow::as_select(), residents::name, residents::login_id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(joined_to_due).collect()
    }

    async fn find_with_owner(&self, id: Uuid) -> Result<Option<DueWithOwner>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(DueRow, String, String)> = dues::table
            .inner_join(residents::table)
            .filter(dues::id.eq(id))
            .select((DueRow::as_select(), residents::name, residents::login_id))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(joined_to_due).transpose()
    }

    async fn earliest_outstanding(
        &self,
        resident_id: ResidentId,
    ) -> Result<Option<Due>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DueRow> = dues::table
            .filter(dues::resident_id.eq(resident_id.as_uuid()))
            .filter(dues::status.eq_any(OUTSTANDING))
            .order(dues::due_date.asc())
            .select(DueRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn status_counts(&self) -> Result<DueStatusCounts, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let grouped: Vec<(String, i64)> = dues::table
            .group_by(dues::status)
            .select((dues::status, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut counts = DueStatusCounts::default();
        for (status, count) in grouped {
            let count = count.unsigned_abs();
            counts.total += count;
            match status.as_str() {
                "Paid" => counts.paid += count,
                "Pending" => counts.pending += count,
                "Overdue" => counts.overdue += count,
                other => tracing::warn!(status = other, "unrecognised due status in counts"),
            }
        }
        Ok(counts)
    }
}
