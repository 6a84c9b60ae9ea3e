//! Caller identity value type.
//!
//! # Responsibility
//! - Represent opaque, comparable principal values supplied by the host.
//!
//! # Invariants
//! - Identities are never minted by core; the hosting environment
//!   authenticates every caller and hands the value in.
//! - Equality is exact byte equality; no normalization is applied.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque principal value for administrators, instructors and students.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wraps a host-authenticated principal string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw principal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Identity;

    #[test]
    fn equality_is_exact() {
        assert_eq!(Identity::new("alice"), Identity::from("alice"));
        assert_ne!(Identity::new("alice"), Identity::new("Alice"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Identity::new("prof.kim")).unwrap();
        assert_eq!(json, "\"prof.kim\"");
    }
}
