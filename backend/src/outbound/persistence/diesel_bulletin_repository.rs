//! PostgreSQL-backed `BulletinRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::bulletin::{Expense, MaintenanceTask, Notice};
use crate::domain::ports::{BulletinRepository, StoreError};

use super::models::{ExpenseRow, MaintenanceTaskRow, NoticeRow};
use super::pool::DbPool;
use super::schema::{expenses, maintenance_tasks, notices};
use super::{map_diesel_error, map_pool_error};

/// Diesel-backed implementation of the `BulletinRepository` port.
#[derive(Clone)]
pub struct DieselBulletinRepository {
    pool: DbPool,
}

impl DieselBulletinRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BulletinRepository for DieselBulletinRepository {
    async fn insert_notice(&self, notice: &Notice) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notices::table)
            .values(NoticeRow::from(notice))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_notices(&self) -> Result<Vec<Notice>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NoticeRow> = notices::table
            .order(notices::created_at.desc())
            .select(NoticeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_task(&self, task: &MaintenanceTask) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(maintenance_tasks::table)
            .values(MaintenanceTaskRow::from(task))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<MaintenanceTask>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MaintenanceTaskRow> = maintenance_tasks::table
            .find(id)
            .select(MaintenanceTaskRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn update_task(&self, task: &MaintenanceTask) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(maintenance_tasks::table.find(task.id))
            .set(MaintenanceTaskRow::from(task))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_tasks(&self) -> Result<Vec<MaintenanceTask>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MaintenanceTaskRow> = maintenance_tasks::table
            .order(maintenance_tasks::scheduled_date.desc())
            .select(MaintenanceTaskRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_expense(&self, expense: &Expense) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(expenses::table)
            .values(ExpenseRow::from(expense))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ExpenseRow> = expenses::table
            .order(expenses::spent_on.desc())
            .select(ExpenseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
