//! Caller identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque user identifier.
///
/// Assigned once at account creation and never reused. Token subjects travel
/// as strings on the wire and are parsed into this type right after the
/// signature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Identity(Uuid);

impl Identity {
    /// Generate a fresh random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[inline]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for Identity {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<Identity> for Uuid {
    fn from(id: Identity) -> Self {
        id.0
    }
}

impl FromStr for Identity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_string_round_trip() {
        let id = Identity::new();
        let parsed: Identity = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_identity_rejects_garbage() {
        assert!("".parse::<Identity>().is_err());
        assert!("not-a-uuid".parse::<Identity>().is_err());
    }

    #[test]
    fn test_fresh_identities_differ() {
        assert_ne!(Identity::new(), Identity::new());
    }
}
