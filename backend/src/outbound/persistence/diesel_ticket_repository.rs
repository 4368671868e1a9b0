//! PostgreSQL-backed `TicketRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::account::LoginId;
use crate::domain::ports::{StoreError, TicketRepository};
use crate::domain::principal::ResidentId;
use crate::domain::ticket::{Ticket, TicketOverview, TicketWithOwner};

use super::models::TicketRow;
use super::pool::DbPool;
use super::schema::{residents, tickets};
use super::{map_diesel_error, map_pool_error};

fn joined_to_ticket(
    (row, owner_name, owner_login_id): (TicketRow, String, String),
) -> Result<TicketWithOwner, StoreError> {
    Ok(TicketWithOwner {
        ticket: row.into(),
        owner_name,
        owner_login_id: LoginId::new(owner_login_id)
            .map_err(|err| StoreError::query(format!("corrupt login id: {err}")))?,
    })
}

/// Diesel-backed implementation of the `TicketRepository` port.
#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for DieselTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(tickets::table)
            .values(TicketRow::from(ticket))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TicketRow> = tickets::table
            .find(id)
            .select(TicketRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn update(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(tickets::table.find(ticket.id))
            .set(TicketRow::from(ticket))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_resident(&self, resident_id: ResidentId) -> Result<Vec<Ticket>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TicketRow> = tickets::table
            .filter(tickets::resident_id.eq(resident_id.as_uuid()))
            .order(tickets::created_at.desc())
            .select(TicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<TicketWithOwner>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(TicketRow, String, String)> = tickets::table
            .inner_join(residents::table)
            .order(tickets::created_at.desc())
            .select((
                TicketRow::as_select(),
                residents::name,
                residents::login_id,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(joined_to_ticket).collect()
    }

    async fn overview(&self) -> Result<TicketOverview, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let grouped: Vec<(String, i64)> = tickets::table
            .group_by(tickets::status)
            .select((tickets::status, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut overview = TicketOverview::default();
        for (status, count) in grouped {
            let count = count.unsigned_abs();
            overview.total += count;
            match status.as_str() {
                "Open" => overview.open += count,
                "Assigned" => overview.assigned += count,
                "Closed" => overview.closed += count,
                _ => {}
            }
        }
        Ok(overview)
    }

    async fn sla_breaches(&self, now: DateTime<Utc>) -> Result<Vec<TicketWithOwner>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(TicketRow, String, String)> = tickets::table
            .inner_join(residents::table)
            .filter(tickets::status.ne("Closed"))
            .filter(tickets::sla_due_at.lt(now))
            .order(tickets::sla_due_at.asc())
            .select((
                TicketRow::as_select(),
                residents::name,
                residents::login_id,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(joined_to_ticket).collect()
    }
}
