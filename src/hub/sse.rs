//! `text/event-stream` decoding for the hub's live feed.
//!
//! [`SseDecoder`] turns lines into [`SseFrame`]s; [`FeedEvent::from_frame`]
//! turns frames into typed events. The two stages are separate so framing can
//! be tested without any knowledge of the hub's event vocabulary.

use crate::model::SessionId;
use thiserror::Error;

/// Event name used when a frame carries no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name (`event:` field, or `message`).
    pub event: String,
    /// Data lines joined with `\n`.
    pub data: String,
}

/// Incremental line-oriented SSE parser.
///
/// Feed it one line at a time (without the terminator). A blank line
/// dispatches the frame collected so far.
#[derive(Debug, Default)]
pub struct SseDecoder {
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Create a decoder with no partial frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line; returns a frame when the line completes one.
    pub fn push_line(&mut self, line: &str) -> Option<SseFrame> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // `id` and `retry` are valid but unused; anything else is ignored.
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: event
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
        })
    }
}

/// Typed hub feed event.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Snapshot sent when the subscription opens.
    Initial(serde_json::Value),
    /// Hub log line.
    Log(serde_json::Value),
    /// A session changed.
    Session {
        /// The changed session, when the payload names a valid one.
        id: Option<SessionId>,
    },
    /// Keep-alive.
    Heartbeat,
}

/// A frame whose payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid `{event}` event payload: {message}")]
pub struct FeedDecodeError {
    /// Event name.
    pub event: String,
    /// Decoder message.
    pub message: String,
}

impl FeedEvent {
    /// Interpret a frame.
    ///
    /// Returns `Ok(None)` for event names the monitor does not handle.
    /// Informational payloads (`initial`, `log`) that are not JSON are kept
    /// as JSON strings. A `session` payload must be JSON; a missing or
    /// invalid `id` still yields a session event, with no id.
    pub fn from_frame(frame: &SseFrame) -> Result<Option<FeedEvent>, FeedDecodeError> {
        let event = match frame.event.as_str() {
            "initial" => FeedEvent::Initial(informational(&frame.data)),
            "log" => FeedEvent::Log(informational(&frame.data)),
            "heartbeat" => FeedEvent::Heartbeat,
            "session" => {
                let notice: serde_json::Value =
                    serde_json::from_str(&frame.data).map_err(|e| FeedDecodeError {
                        event: frame.event.clone(),
                        message: e.to_string(),
                    })?;
                let id = notice
                    .get("id")
                    .and_then(serde_json::Value::as_str)
                    .and_then(|raw| SessionId::new(raw).ok());
                FeedEvent::Session { id }
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

fn informational(data: &str) -> serde_json::Value {
    serde_json::from_str(data).unwrap_or_else(|_| serde_json::Value::String(data.to_string()))
}
