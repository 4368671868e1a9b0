//! Authenticated principal identity.
//!
//! Residents and administrators authenticate against separate collections but
//! share one session mechanism. A [`Principal`] is the tagged union stored in
//! the session cookie; per-route authorisation checks the tag instead of
//! running parallel middlewares per role.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which collection the principal authenticated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    Resident,
    Admin,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resident => f.write_str("resident"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// Stable resident identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidentId(Uuid);

impl ResidentId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an identifier read back from storage.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Stable administrator identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminId(Uuid);

impl AdminId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an identifier read back from storage.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Authenticated caller identity persisted in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Principal {
    Resident(ResidentId),
    Admin(AdminId),
}

impl Principal {
    /// The collection tag for this principal.
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Self::Resident(_) => PrincipalKind::Resident,
            Self::Admin(_) => PrincipalKind::Admin,
        }
    }

    /// Resident identifier when the caller is a resident.
    pub fn as_resident(&self) -> Option<ResidentId> {
        match self {
            Self::Resident(id) => Some(*id),
            Self::Admin(_) => None,
        }
    }

    /// Admin identifier when the caller is an administrator.
    pub fn as_admin(&self) -> Option<AdminId> {
        match self {
            Self::Admin(id) => Some(*id),
            Self::Resident(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn principal_serialises_with_kind_tag() {
        let id = ResidentId::random();
        let value = serde_json::to_value(Principal::Resident(id)).expect("serialise");
        assert_eq!(value["kind"], "resident");
        assert_eq!(value["id"], id.as_uuid().to_string());
    }

    #[rstest]
    fn principal_round_trips() {
        let principal = Principal::Admin(AdminId::random());
        let json = serde_json::to_string(&principal).expect("serialise");
        let back: Principal = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, principal);
        assert!(back.as_admin().is_some());
        assert!(back.as_resident().is_none());
    }
}
