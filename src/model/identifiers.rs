//! Identifier newtypes with smart constructors.
//!
//! Identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Hub session identifier (e.g., "2025-01-10-agent.jsonl").
///
/// Sessions are created and destroyed by the hub; the monitor only observes
/// them through the directory listing and `session` feed events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Smart constructor: validates non-empty session ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidSessionId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidSessionId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier up to the first `.`, used for export file names.
    ///
    /// `"abc.jsonl"` becomes `"abc"`; identifiers without a dot are returned whole.
    pub fn stem(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        SessionId::new(raw).map_err(serde::de::Error::custom)
    }
}

// ===== Error Types =====

/// Rejected session identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSessionId {
    /// The identifier was the empty string.
    #[error("Session ID cannot be empty")]
    Empty,
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_accepts_valid_string() {
        let id = SessionId::new("session-12345");
        assert!(id.is_ok(), "Valid session ID should be accepted");
    }

    #[test]
    fn session_id_rejects_empty_string() {
        let id = SessionId::new("");
        assert!(
            matches!(id, Err(InvalidSessionId::Empty)),
            "Empty string should return InvalidSessionId::Empty"
        );
    }

    #[test]
    fn session_id_display_returns_inner_string() {
        let id = SessionId::new("abc.jsonl").expect("valid id");
        assert_eq!(id.to_string(), "abc.jsonl");
        assert_eq!(id.as_str(), "abc.jsonl");
    }

    #[test]
    fn stem_cuts_at_first_dot() {
        let id = SessionId::new("2025-01-10.agent.jsonl").expect("valid id");
        assert_eq!(id.stem(), "2025-01-10");

        let plain = SessionId::new("plain").expect("valid id");
        assert_eq!(plain.stem(), "plain");
    }

    #[test]
    fn deserialize_rejects_empty_id() {
        let result: Result<SessionId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err(), "Empty id must not deserialize");

        let ok: SessionId = serde_json::from_str("\"s1\"").expect("valid id");
        assert_eq!(ok.as_str(), "s1");
    }
}
