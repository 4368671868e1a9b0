//! Guest-pass entities and pass-code generation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::LoginId;
use super::booking::UnknownStatus;
use super::principal::{AdminId, ResidentId};

/// Guest-pass lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum GuestPassStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Expired,
}

impl GuestPassStatus {
    /// Canonical string form as persisted and serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Cancelled => "Cancelled",
            Self::Expired => "Expired",
        }
    }
}

impl fmt::Display for GuestPassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuestPassStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            "Cancelled" => Ok(Self::Cancelled),
            "Expired" => Ok(Self::Expired),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Alphabet for pass codes: uppercase alphanumerics without lookalikes kept
/// simple; the gate staff read these over the intercom.
const PASS_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const PASS_CODE_LEN: usize = 6;

/// Generate an opaque `GP-XXXXXX` visitor code.
///
/// A single draw; the store's unique index rejects the negligible-probability
/// collision instead of retrying.
pub fn generate_pass_code(rng: &mut impl Rng) -> String {
    let suffix: String = (0..PASS_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..PASS_CODE_ALPHABET.len());
            char::from(PASS_CODE_ALPHABET[idx])
        })
        .collect();
    format!("GP-{suffix}")
}

/// A time-bound visitor authorisation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestPass {
    pub id: Uuid,
    pub resident_id: ResidentId,
    pub guest_name: String,
    pub visit_date: DateTime<Utc>,
    pub reason: String,
    /// Assigned only on approval; unique across passes when present.
    pub code: Option<String>,
    pub status: GuestPassStatus,
    pub handled_by: Option<AdminId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Guest pass joined with requester and handler display fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestPassWithNames {
    pub pass: GuestPass,
    pub owner_name: String,
    pub owner_login_id: LoginId,
    pub handler_login_id: Option<LoginId>,
}
