//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod key_action;
pub mod message;
pub mod session;
pub mod timestamp;

// Re-export for convenience
pub use error::{AppError, HubError, ParseError};
pub use identifiers::{InvalidSessionId, SessionId};
pub use key_action::KeyAction;
pub use message::{ContentPart, Message, MessageContent, MessageRecord, Role};
pub use session::{SessionBody, SessionInfo, SessionList};
pub use timestamp::Timestamp;
