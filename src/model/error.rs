//! Error types for hubmon.
//!
//! This module defines the error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error wrapping all domain-specific failures
//!   - [`HubError`] - Hub HTTP/SSE failures (transport, rejected command, bad body)
//!   - [`ParseError`] - Log line parsing failures (malformed JSON)
//!   - [`ExportError`](crate::export::ExportError) - HTML export failures
//!   - `std::io::Error` - Terminal/TUI rendering failures
//!
//! # Error Recovery Strategy
//!
//! Almost nothing here is fatal. Malformed log lines are skipped at the record
//! level. Feed drops are recovered by the reconnect timer. Failed fetches and
//! rejected commands become a toast notification and the UI keeps running.
//! Only terminal I/O failures propagate to `main`.

use thiserror::Error;

/// Top-level application error encompassing all failure modes.
///
/// Returned from the one-shot CLI commands and the TUI entry point. Domain
/// errors convert via `From`, so callers can use `?` throughout.
#[derive(Debug, Error)]
pub enum AppError {
    /// A hub request failed.
    #[error("Hub request failed: {0}")]
    Hub(#[from] HubError),

    /// Writing a session export failed.
    #[error("Export failed: {0}")]
    Export(#[from] crate::export::ExportError),

    /// A message to send was empty or whitespace.
    #[error("Please enter a message")]
    EmptyMessage,

    /// Terminal or TUI rendering error.
    ///
    /// Without a working terminal the TUI cannot function, so this is fatal.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors talking to the hub.
///
/// Every variant names the endpoint that failed so log lines and
/// notifications can be traced back to a request.
///
/// # Recovery Patterns
///
/// - **Transport**: feed subscription → reconnect timer; one-shot fetch → toast, no retry
/// - **Rejected**: remote command refused → danger toast with the server's error text
/// - **Decode**: hub answered with an unexpected body → toast, prior state kept
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// The request never produced an HTTP response (DNS, refused, reset, timeout).
    #[error("{endpoint}: {message}")]
    Transport {
        /// Request path, e.g. `/api/sessions`.
        endpoint: String,
        /// Transport error description.
        message: String,
    },

    /// The hub answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Rejected {
        /// Request path.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Server-provided error text (JSON `error` field or raw body).
        message: String,
    },

    /// The response body could not be decoded.
    #[error("{endpoint}: invalid response body: {message}")]
    Decode {
        /// Request path.
        endpoint: String,
        /// Decoder error description.
        message: String,
    },
}

impl HubError {
    /// Human-facing detail for notifications.
    ///
    /// For rejected commands this is the server's own error text (falling back
    /// to the status when the server sent nothing).
    pub fn detail(&self) -> String {
        match self {
            HubError::Transport { message, .. } => message.clone(),
            HubError::Rejected {
                status, message, ..
            } => {
                if message.trim().is_empty() {
                    format!("HTTP {status}")
                } else {
                    message.clone()
                }
            }
            HubError::Decode { message, .. } => message.clone(),
        }
    }
}

/// Errors encountered when parsing a single log line.
///
/// Parsing errors are **non-fatal**: malformed lines are logged at debug
/// level and skipped, never aborting the rest of the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A log line contains syntactically or structurally invalid JSON.
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// The 1-based line number in the session content.
        line: usize,
        /// The JSON parser error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_detail_prefers_server_text() {
        let err = HubError::Rejected {
            endpoint: "/api/agent/send-message".to_string(),
            status: 503,
            message: "agent busy".to_string(),
        };
        assert_eq!(err.detail(), "agent busy");
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn rejected_detail_falls_back_to_status() {
        let err = HubError::Rejected {
            endpoint: "/api/control/stop".to_string(),
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(err.detail(), "HTTP 500");
    }

    #[test]
    fn parse_error_mentions_line_number() {
        let err = ParseError::InvalidJson {
            line: 42,
            message: "EOF while parsing".to_string(),
        };
        assert!(err.to_string().contains("line 42"));
    }

    #[test]
    fn hub_error_converts_into_app_error() {
        fn fails() -> Result<(), AppError> {
            Err(HubError::Transport {
                endpoint: "/api/health".to_string(),
                message: "connection refused".to_string(),
            })?;
            Ok(())
        }
        assert!(matches!(fails(), Err(AppError::Hub(_))));
    }
}
