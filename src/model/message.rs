//! Message records from a hub session log.
//!
//! Types represent one eligible line of the session's newline-delimited log:
//! `{type: "message", timestamp, message: {role, content}}`.

use crate::model::Timestamp;

// ===== Role =====

/// Message role as written by the hub.
///
/// Known roles get dedicated variants for styling; anything else is kept
/// verbatim so nothing is lost in rendering or export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Message authored by the operator or upstream user
    User,
    /// Message authored by the agent
    Assistant,
    /// System prompt or hub-injected message
    System,
    /// Any other role string
    Other(String),
    /// Role field absent
    Unknown,
}

impl Role {
    /// Classify a raw role string.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Role::Unknown,
            Some("user") => Role::User,
            Some("assistant") => Role::Assistant,
            Some("system") => Role::System,
            Some("") => Role::Unknown,
            Some(other) => Role::Other(other.to_string()),
        }
    }

    /// Lowercase role name used as a CSS class and label.
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Other(raw) => raw,
            Role::Unknown => "unknown",
        }
    }
}

// ===== MessageContent =====

/// Content of a message.
///
/// Either a plain string or an ordered list of typed parts. Sum type ensures
/// exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// Structured content parts
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Text shown for this content.
    ///
    /// Plain text is returned as is. For structured content, only parts tagged
    /// `text` contribute, joined in order with `\n`.
    pub fn display_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter(|part| part.is_text())
                .map(|part| part.text().unwrap_or(""))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

// ===== ContentPart =====

/// One typed part of structured content (`{type, text?, ...}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPart {
    kind: String,
    text: Option<String>,
}

impl ContentPart {
    /// Create a part with the given type tag and optional text.
    pub fn new(kind: impl Into<String>, text: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            text,
        }
    }

    /// Shorthand for a `text` part.
    pub fn text_part(text: impl Into<String>) -> Self {
        Self::new("text", Some(text.into()))
    }

    /// The part's type tag (`text`, `tool_use`, ...).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether this part contributes to rendered text.
    pub fn is_text(&self) -> bool {
        self.kind == "text"
    }

    /// The part's text, if present.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

// ===== Message =====

/// The `message` object of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: MessageContent,
}

impl Message {
    /// Create a message.
    pub fn new(role: Role, content: MessageContent) -> Self {
        Self { role, content }
    }

    /// Who authored the message.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Raw content.
    pub fn content(&self) -> &MessageContent {
        &self.content
    }
}

// ===== MessageRecord =====

/// An eligible, renderable log line.
///
/// Only lines with `type == "message"` and a present `message` object become
/// records; the parser guarantees this, so every `MessageRecord` is renderable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    timestamp: Timestamp,
    message: Message,
}

impl MessageRecord {
    /// Create a record.
    pub fn new(timestamp: Timestamp, message: Message) -> Self {
        Self { timestamp, message }
    }

    /// When the record was written.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The message payload.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Shorthand for `message().role()`.
    pub fn role(&self) -> &Role {
        self.message.role()
    }

    /// Rendered text of the record.
    pub fn text(&self) -> String {
        self.message.content().display_text()
    }

    /// Number of `\n`-separated lines in the rendered text.
    ///
    /// Empty text counts as one line, matching how the body is laid out.
    pub fn line_count(&self) -> usize {
        self.text().split('\n').count()
    }
}
