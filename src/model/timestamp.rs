//! Lenient timestamps as emitted by the hub.
//!
//! The hub writes timestamps either as RFC 3339 strings or as epoch
//! milliseconds. Unparseable values are kept as "unknown" instead of
//! rejecting the surrounding record.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// A point in time that may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp(Option<DateTime<Utc>>);

/// Placeholder shown when a timestamp could not be interpreted.
pub const UNKNOWN_TIME: &str = "--:--:--";

impl Timestamp {
    /// Wrap a known instant.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(Some(instant))
    }

    /// A timestamp that could not be determined.
    pub fn unknown() -> Self {
        Self(None)
    }

    /// Interpret epoch milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        Self(Utc.timestamp_millis_opt(millis).single())
    }

    /// Interpret an RFC 3339 string.
    pub fn parse(raw: &str) -> Self {
        Self(
            DateTime::parse_from_rfc3339(raw.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        )
    }

    /// The instant, if known.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    /// Local wall-clock time (`HH:MM:SS`), used in the chat pane and sidebar.
    pub fn local_time(&self) -> String {
        match self.0 {
            Some(instant) => instant.with_timezone(&Local).format("%H:%M:%S").to_string(),
            None => UNKNOWN_TIME.to_string(),
        }
    }

    /// Local date and time, used in exports.
    pub fn local_date_time(&self) -> String {
        match self.0 {
            Some(instant) => instant
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => "unknown time".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawTimestamp::deserialize(deserializer)?;
        Ok(match raw {
            RawTimestamp::Millis(ms) => Timestamp::from_millis(ms),
            RawTimestamp::Float(ms) => Timestamp::from_millis(ms as i64),
            RawTimestamp::Text(text) => Timestamp::parse(&text),
            RawTimestamp::Other(_) => Timestamp::unknown(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_string() {
        let ts: Timestamp = serde_json::from_str("\"2025-12-25T10:00:00Z\"").unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 12, 25, 10, 0, 0).unwrap();
        assert_eq!(ts.instant(), Some(expected));
    }

    #[test]
    fn parses_epoch_millis() {
        let ts: Timestamp = serde_json::from_str("1735120800000").unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 12, 25, 10, 0, 0).unwrap();
        assert_eq!(ts.instant(), Some(expected));
    }

    #[test]
    fn garbage_becomes_unknown_instead_of_error() {
        let ts: Timestamp = serde_json::from_str("\"yesterday-ish\"").unwrap();
        assert_eq!(ts.instant(), None);
        assert_eq!(ts.local_time(), UNKNOWN_TIME);

        let ts: Timestamp = serde_json::from_str("{\"nested\":true}").unwrap();
        assert_eq!(ts, Timestamp::unknown());
    }
}
