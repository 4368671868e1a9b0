//! PostgreSQL-backed `PollRepository` implementation using Diesel.
//!
//! Polls split across two tables; options are reassembled in `position`
//! order. The vote increment runs as a single `votes = votes + 1` update so
//! concurrent ballots never lose counts.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::poll::{Poll, PollOption};
use crate::domain::ports::{PollRepository, StoreError};
use crate::domain::principal::AdminId;

use super::models::{PollOptionRow, PollRow};
use super::pool::DbPool;
use super::schema::{poll_options, polls};
use super::{map_diesel_error, map_pool_error};

fn assemble(poll: PollRow, option_rows: Vec<PollOptionRow>) -> Poll {
    let mut option_rows = option_rows;
    option_rows.sort_by_key(|row| row.position);
    Poll {
        id: poll.id,
        question: poll.question,
        options: option_rows
            .into_iter()
            .map(|row| PollOption {
                text: row.text,
                votes: row.votes.unsigned_abs(),
            })
            .collect(),
        created_by: AdminId::from_uuid(poll.created_by),
        created_at: poll.created_at,
    }
}

fn option_rows(poll: &Poll) -> Vec<PollOptionRow> {
    poll.options
        .iter()
        .enumerate()
        .map(|(position, option)| PollOptionRow {
            id: Uuid::new_v4(),
            poll_id: poll.id,
            position: i32::try_from(position).unwrap_or(i32::MAX),
            text: option.text.clone(),
            votes: i32::try_from(option.votes).unwrap_or(i32::MAX),
        })
        .collect()
}

/// Diesel-backed implementation of the `PollRepository` port.
#[derive(Clone)]
pub struct DieselPollRepository {
    pool: DbPool,
}

impl DieselPollRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load(
        &self,
        conn: &mut diesel_async::pooled_connection::bb8::PooledConnection<
            '_,
            diesel_async::AsyncPgConnection,
        >,
        id: Uuid,
    ) -> Result<Option<Poll>, StoreError> {
        let poll: Option<PollRow> = polls::table
            .find(id)
            .select(PollRow::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(poll) = poll else {
            return Ok(None);
        };
        let options: Vec<PollOptionRow> = poll_options::table
            .filter(poll_options::poll_id.eq(id))
            .select(PollOptionRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Some(assemble(poll, options)))
    }
}

#[async_trait]
impl PollRepository for DieselPollRepository {
    async fn insert(&self, poll: &Poll) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(polls::table)
            .values(PollRow {
                id: poll.id,
                question: poll.question.clone(),
                created_by: *poll.created_by.as_uuid(),
                created_at: poll.created_at,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        diesel::insert_into(poll_options::table)
            .values(option_rows(poll))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        self.load(&mut conn, id).await
    }

    async fn list_all(&self) -> Result<Vec<Poll>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let poll_rows: Vec<PollRow> = polls::table
            .order(polls::created_at.desc())
            .select(PollRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let option_rows: Vec<PollOptionRow> = poll_options::table
            .select(PollOptionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(poll_rows
            .into_iter()
            .map(|poll| {
                let options = option_rows
                    .iter()
                    .filter(|row| row.poll_id == poll.id)
                    .cloned()
                    .collect();
                assemble(poll, options)
            })
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(poll_options::table.filter(poll_options::poll_id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let deleted = diesel::delete(polls::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn record_vote(
        &self,
        poll_id: Uuid,
        option_index: usize,
    ) -> Result<Option<Poll>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let position = i32::try_from(option_index)
            .map_err(|_| StoreError::query("option index out of range"))?;
        let updated = diesel::update(
            poll_options::table
                .filter(poll_options::poll_id.eq(poll_id))
                .filter(poll_options::position.eq(position)),
        )
        .set(poll_options::votes.eq(poll_options::votes + 1))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(StoreError::query("option index out of range"));
        }
        self.load(&mut conn, poll_id).await
    }
}
