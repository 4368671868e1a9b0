//! Admin-published records: notices, maintenance tasks, expenses.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::booking::UnknownStatus;
use super::principal::AdminId;

/// A notice-board announcement.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_by: AdminId,
    pub created_at: DateTime<Utc>,
}

/// Maintenance task states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Canonical string form as persisted and serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "In Progress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// A scheduled upkeep task for society infrastructure.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceTask {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub created_by: AdminId,
    pub created_at: DateTime<Utc>,
}

/// A logged society expense.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub title: String,
    /// Whole currency units; must be positive.
    pub amount: i64,
    pub category: String,
    pub description: String,
    pub spent_on: DateTime<Utc>,
    pub created_by: AdminId,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn task_status_round_trips() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert!("Paused".parse::<TaskStatus>().is_err());
    }
}
