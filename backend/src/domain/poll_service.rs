//! Poll rules: creation, voting bounds, deletion.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use uuid::Uuid;

use super::error::Error;
use super::poll::{Poll, PollValidationError};
use super::ports::PollRepository;
use super::principal::AdminId;

/// Poll service.
#[derive(Clone)]
pub struct PollService {
    polls: Arc<dyn PollRepository>,
    clock: Arc<dyn Clock>,
}

impl PollService {
    /// Create a new service.
    pub fn new(polls: Arc<dyn PollRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { polls, clock }
    }

    /// Admin creates a poll; options are fixed afterwards.
    pub async fn create(
        &self,
        admin: AdminId,
        question: &str,
        options: Vec<String>,
    ) -> Result<Poll, Error> {
        let poll = Poll::create(question, options, admin, self.clock.utc())
            .map_err(map_validation_error)?;
        self.polls.insert(&poll).await?;
        Ok(poll)
    }

    /// All polls, newest first.
    pub async fn list(&self) -> Result<Vec<Poll>, Error> {
        Ok(self.polls.list_all().await?)
    }

    /// Fetch one poll.
    pub async fn get(&self, id: Uuid) -> Result<Poll, Error> {
        self.polls
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("poll not found"))
    }

    /// Record a single ballot for `option_index`.
    ///
    /// Out-of-range indices are rejected before any tally changes.
    // TODO: nothing stops a resident voting twice; a (poll_id, resident_id)
    // ballot table would make this one-vote-per-resident.
    pub async fn vote(&self, id: Uuid, option_index: usize) -> Result<Poll, Error> {
        let poll = self.get(id).await?;
        if option_index >= poll.options.len() {
            return Err(Error::invalid_request("invalid option selected")
                .with_details(json!({ "optionIndex": option_index })));
        }
        self.polls
            .record_vote(id, option_index)
            .await?
            .ok_or_else(|| Error::not_found("poll not found"))
    }

    /// Admin removes a poll.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        if self.polls.delete(id).await? {
            Ok(())
        } else {
            Err(Error::not_found("poll not found"))
        }
    }
}

fn map_validation_error(err: PollValidationError) -> Error {
    Error::invalid_request(err.to_string())
}
