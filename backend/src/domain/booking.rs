//! Amenity booking model and the interval-overlap rule.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::LoginId;
use super::principal::ResidentId;

/// A bookable shared facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Amenity {
    pub id: &'static str,
    pub name: &'static str,
}

/// Fixed amenity catalogue offered to residents.
pub const AMENITIES: [Amenity; 4] = [
    Amenity {
        id: "clubhouse",
        name: "Clubhouse",
    },
    Amenity {
        id: "pool",
        name: "Swimming Pool Area",
    },
    Amenity {
        id: "gym",
        name: "Gymnasium",
    },
    Amenity {
        id: "tennis",
        name: "Tennis Court",
    },
];

/// Booking lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this state holds its time slot.
    pub fn holds_slot(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Canonical string form as persisted and serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Error returned when parsing an unrecognised status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

/// Validation errors raised when constructing a [`BookingWindow`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingWindowError {
    #[error("start time must be before end time")]
    EmptyOrInverted,
}

/// Half-open time interval `[start, end)` claimed by a booking.
///
/// ## Invariants
/// - `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BookingWindow {
    /// Construct a window, rejecting empty and inverted intervals.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, BookingWindowError> {
        if start >= end {
            return Err(BookingWindowError::EmptyOrInverted);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Half-open overlap test: two windows conflict exactly when
    /// `self.start < other.end && self.end > other.start`. Back-to-back
    /// windows where one ends as the other starts do NOT overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// A reservation request against the amenity catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub amenity_name: String,
    pub resident_id: ResidentId,
    pub event_description: String,
    pub window: BookingWindow,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking joined with the owner's display fields for list views.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingWithOwner {
    pub booking: Booking,
    pub owner_name: String,
    pub owner_login_id: LoginId,
}
