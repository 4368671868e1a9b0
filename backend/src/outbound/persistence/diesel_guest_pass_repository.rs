//! PostgreSQL-backed `GuestPassRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::account::LoginId;
use crate::domain::guest_pass::{GuestPass, GuestPassWithNames};
use crate::domain::ports::{GuestPassRepository, StoreError};
use crate::domain::principal::ResidentId;

use super::models::GuestPassRow;
use super::pool::DbPool;
use super::schema::{admins, guest_passes, residents};
use super::{map_diesel_error, map_pool_error};

type JoinedRow = (GuestPassRow, String, String, Option<String>);

fn joined_to_pass(
    (row, owner_name, owner_login_id, handler_login_id): JoinedRow,
) -> Result<GuestPassWithNames, StoreError> {
    let corrupt = |err| StoreError::query(format!("corrupt login id: {err}"));
    Ok(GuestPassWithNames {
        pass: row.into(),
        owner_name,
        owner_login_id: LoginId::new(owner_login_id).map_err(corrupt)?,
        handler_login_id: handler_login_id
            .map(LoginId::new)
            .transpose()
            .map_err(corrupt)?,
    })
}

/// Diesel-backed implementation of the `GuestPassRepository` port.
#[derive(Clone)]
pub struct DieselGuestPassRepository {
    pool: DbPool,
}

impl DieselGuestPassRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestPassRepository for DieselGuestPassRepository {
    async fn insert(&self, pass: &GuestPass) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(guest_passes::table)
            .values(GuestPassRow::from(pass))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: Uuid) -> Result<Option<GuestPass>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GuestPassRow> = guest_passes::table
            .find(id)
            .select(GuestPassRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn update(&self, pass: &GuestPass) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(guest_passes::table.find(pass.id))
            .set(GuestPassRow::from(pass))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_resident(
        &self,
        resident_id: ResidentId,
    ) -> Result<Vec<GuestPassWithNames>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<JoinedRow> = guest_passes::table
            .inner_join(residents::table)
            .left_join(admins::table)
            .filter(guest_passes::resident_id.eq(resident_id.as_uuid()))
            .order(guest_passes::visit_date.desc())
            .select((
                GuestPassRow::as_select(),
                residents::name,
                residents::login_id,
                admins::login_id.nullable(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(joined_to_pass).collect()
    }

    async fn list_all(&self) -> Result<Vec<GuestPassWithNames>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<JoinedRow> = guest_passes::table
            .inner_join(residents::table)
            .left_join(admins::table)
            .order(guest_passes::created_at.desc())
            .select((
                GuestPassRow::as_select(),
                residents::name,
                residents::login_id,
                admins::login_id.nullable(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(joined_to_pass).collect()
    }

    async fn find_with_names(&self, id: Uuid) -> Result<Option<GuestPassWithNames>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<JoinedRow> = guest_passes::table
            .inner_join(residents::table)
            .left_join(admins::table)
            .filter(guest_passes::id.eq(id))
            .select((
                GuestPassRow::as_select(),
                residents::name,
                residents::login_id,
                admins::login_id.nullable(),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(joined_to_pass).transpose()
    }
}
