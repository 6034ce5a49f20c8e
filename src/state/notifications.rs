//! Toast notification queue.
//!
//! Provides a bounded queue of short-lived messages. Each toast is dismissed
//! by a scheduler task after [`TOAST_LIFETIME`]; the queue only stores them.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

#[cfg(test)]
#[path = "notifications_tests.rs"]
mod tests;

/// How long a toast stays on screen.
pub const TOAST_LIFETIME: Duration = Duration::from_millis(3000);

/// Maximum toasts retained at once.
pub const MAX_TOASTS: usize = 5;

/// Identity of one toast, used to dismiss it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    /// Wrap a raw id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    /// Operation succeeded
    Success,
    /// Neutral information
    Info,
    /// Operator input was rejected
    Warning,
    /// Something failed
    Danger,
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToastLevel::Success => "success",
            ToastLevel::Info => "info",
            ToastLevel::Warning => "warning",
            ToastLevel::Danger => "danger",
        };
        f.write_str(name)
    }
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Identity for dismissal
    pub id: ToastId,
    /// Severity
    pub level: ToastLevel,
    /// Text shown to the operator
    pub message: String,
}

/// Bounded toast queue (oldest at front, newest at back).
#[derive(Debug)]
pub struct Notifications {
    toasts: VecDeque<Toast>,
    capacity: usize,
    next_id: u64,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(MAX_TOASTS)
    }
}

impl Notifications {
    /// Create a queue holding at most `capacity` toasts.
    pub fn new(capacity: usize) -> Self {
        Self {
            toasts: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Add a toast, evicting the oldest when full.
    ///
    /// The message is also written to the log at a matching level.
    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) -> ToastId {
        let message = message.into();
        match level {
            ToastLevel::Success | ToastLevel::Info => info!(%level, "{message}"),
            ToastLevel::Warning => warn!(%level, "{message}"),
            ToastLevel::Danger => error!(%level, "{message}"),
        }

        let id = ToastId(self.next_id);
        self.next_id += 1;

        if self.capacity == 0 {
            return id;
        }
        while self.toasts.len() >= self.capacity {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast { id, level, message });
        id
    }

    /// Remove a toast. Unknown ids (already evicted) are ignored.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    /// Toasts currently shown, oldest first.
    pub fn toasts(&self) -> &VecDeque<Toast> {
        &self.toasts
    }

    /// Whether no toast is shown.
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
