//! Session directory entries as listed by the hub.

use crate::model::{SessionId, Timestamp};
use serde::{Deserialize, Deserializer};

/// One session in the hub's directory listing.
///
/// Lifecycle is owned by the hub; the monitor only observes these through
/// `GET /api/sessions`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionInfo {
    /// Unique session identifier.
    pub id: SessionId,
    /// Display title, if the hub supplied one.
    #[serde(default)]
    pub title: Option<String>,
    /// Size of the session log in bytes. Zero when the hub reports none.
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: u64,
    /// Last modification time.
    #[serde(default)]
    pub modified: Timestamp,
}

impl SessionInfo {
    /// Title shown in the sidebar: the title, or the id when absent/empty.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => self.id.as_str(),
        }
    }

    /// Size in kilobytes with one decimal (`"12.5 KB"`).
    pub fn display_size(&self) -> String {
        format!("{:.1} KB", self.size as f64 / 1024.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSize {
    Bytes(u64),
    Float(f64),
    Other(serde_json::Value),
}

// One odd entry must not fail the whole listing.
fn lenient_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawSize::deserialize(deserializer)? {
        RawSize::Bytes(bytes) => bytes,
        RawSize::Float(bytes) if bytes.is_finite() && bytes > 0.0 => bytes as u64,
        RawSize::Float(_) | RawSize::Other(_) => 0,
    })
}

/// Response body of `GET /api/sessions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionList {
    /// Sessions in hub order.
    #[serde(default)]
    pub sessions: Vec<SessionInfo>,
}

/// Response body of `GET /api/sessions/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionBody {
    /// Raw newline-delimited session log.
    #[serde(default)]
    pub content: String,
}
