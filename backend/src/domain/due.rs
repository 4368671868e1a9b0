//! Dues ledger entities.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::LoginId;
use super::booking::UnknownStatus;
use super::principal::ResidentId;

/// Ledger states for a billed charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DueStatus {
    Pending,
    Paid,
    Overdue,
}

impl DueStatus {
    /// Whether the charge still awaits payment.
    pub fn outstanding(self) -> bool {
        matches!(self, Self::Pending | Self::Overdue)
    }

    /// Canonical string form as persisted and serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DueStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Overdue" => Ok(Self::Overdue),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// A billed charge owed by a resident.
///
/// Amounts are whole currency units; the ledger never splits below that.
#[derive(Debug, Clone, PartialEq)]
pub struct Due {
    pub id: Uuid,
    pub resident_id: ResidentId,
    pub due_type: String,
    pub amount: i64,
    pub due_date: DateTime<Utc>,
    pub status: DueStatus,
    pub paid_on: Option<DateTime<Utc>>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Due joined with the owner's display fields for admin list views.
#[derive(Debug, Clone, PartialEq)]
pub struct DueWithOwner {
    pub due: Due,
    pub owner_name: String,
    pub owner_login_id: LoginId,
}

/// The "what do I owe right now" answer for a resident.
///
/// When no outstanding due exists this is a synthesised zero-amount `Paid`
/// display record, not a persisted ledger event.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentDue {
    pub id: Option<Uuid>,
    pub amount: i64,
    pub status: DueStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub due_type: Option<String>,
}

impl CurrentDue {
    /// The settled placeholder shown when nothing is outstanding.
    pub fn settled() -> Self {
        Self {
            id: None,
            amount: 0,
            status: DueStatus::Paid,
            due_date: None,
            due_type: None,
        }
    }
}

impl From<Due> for CurrentDue {
    fn from(due: Due) -> Self {
        Self {
            id: Some(due.id),
            amount: due.amount,
            status: due.status,
            due_date: Some(due.due_date),
            due_type: Some(due.due_type),
        }
    }
}

/// Ledger counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DueStatusCounts {
    pub total: u64,
    pub paid: u64,
    pub pending: u64,
    pub overdue: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DueStatus::Pending, true)]
    #[case(DueStatus::Overdue, true)]
    #[case(DueStatus::Paid, false)]
    fn outstanding_states(#[case] status: DueStatus, #[case] expected: bool) {
        assert_eq!(status.outstanding(), expected);
    }

    #[rstest]
    fn settled_placeholder_is_zero_paid() {
        let current = CurrentDue::settled();
        assert_eq!(current.amount, 0);
        assert_eq!(current.status, DueStatus::Paid);
        assert!(current.id.is_none());
        assert!(current.due_date.is_none());
    }

    #[rstest]
    fn status_parsing_rejects_unknown_values() {
        assert!("Waived".parse::<DueStatus>().is_err());
        assert_eq!("Overdue".parse::<DueStatus>(), Ok(DueStatus::Overdue));
    }
}
