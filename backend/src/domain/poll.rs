//! Community polls.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::principal::AdminId;

/// Validation errors for poll creation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollValidationError {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("a poll needs at least {min} options")]
    TooFewOptions { min: usize },
    #[error("option text must not be empty")]
    EmptyOption,
}

/// Minimum number of options a poll must offer.
pub const POLL_OPTIONS_MIN: usize = 2;

/// One answer choice and its tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOption {
    pub text: String,
    pub votes: u32,
}

/// An admin-created poll; options are fixed after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Poll {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<PollOption>,
    pub created_by: AdminId,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    /// Validate and build a new poll with zeroed tallies.
    pub fn create(
        question: &str,
        option_texts: Vec<String>,
        created_by: AdminId,
        now: DateTime<Utc>,
    ) -> Result<Self, PollValidationError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PollValidationError::EmptyQuestion);
        }
        if option_texts.len() < POLL_OPTIONS_MIN {
            return Err(PollValidationError::TooFewOptions {
                min: POLL_OPTIONS_MIN,
            });
        }
        let options = option_texts
            .into_iter()
            .map(|text| {
                let text = text.trim().to_owned();
                if text.is_empty() {
                    Err(PollValidationError::EmptyOption)
                } else {
                    Ok(PollOption { text, votes: 0 })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: Uuid::new_v4(),
            question: question.to_owned(),
            options,
            created_by,
            created_at: now,
        })
    }

    /// Total ballots cast across all options.
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|option| u64::from(option.votes)).sum()
    }
}
