//! PostgreSQL-backed `AccountRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::account::{Admin, EmailAddress, LoginId, Resident};
use crate::domain::ports::{AccountRepository, StoreError};
use crate::domain::principal::{AdminId, ResidentId};

use super::models::{AdminRow, ResidentRow};
use super::pool::DbPool;
use super::schema::{admins, residents};
use super::{map_diesel_error, map_pool_error};

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert_resident(&self, resident: &Resident) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(residents::table)
            .values(ResidentRow::from(resident))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_resident(&self, id: ResidentId) -> Result<Option<Resident>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ResidentRow> = residents::table
            .find(id.as_uuid())
            .select(ResidentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_resident_by_login(
        &self,
        login_id: &LoginId,
    ) -> Result<Option<Resident>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ResidentRow> = residents::table
            .filter(residents::login_id.eq(login_id.as_str()))
            .select(ResidentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn resident_exists(
        &self,
        login_id: &LoginId,
        email: &EmailAddress,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = residents::table
            .filter(
                residents::login_id
                    .eq(login_id.as_str())
                    .or(residents::email.eq(email.as_str())),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count > 0)
    }

    async fn list_residents(&self) -> Result<Vec<Resident>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ResidentRow> = residents::table
            .order(residents::created_at.desc())
            .select(ResidentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_residents(&self) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = residents::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count.unsigned_abs())
    }

    async fn insert_admin(&self, admin: &Admin) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(admins::table)
            .values(AdminRow::from(admin))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_admin(&self, id: AdminId) -> Result<Option<Admin>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AdminRow> = admins::table
            .find(id.as_uuid())
            .select(AdminRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_admin_by_login(&self, login_id: &LoginId) -> Result<Option<Admin>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AdminRow> = admins::table
            .filter(admins::login_id.eq(login_id.as_str()))
            .select(AdminRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }
}
