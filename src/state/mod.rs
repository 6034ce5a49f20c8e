//! UI state machine (pure).
//!
//! All state transitions are pure functions testable without TUI.

pub mod app_state;
pub mod input;
pub mod modal;
pub mod notifications;

// Re-export for convenience
pub use app_state::{AppEvent, AppState, Effect, FocusPane};
pub use input::TextInput;
pub use modal::{Mode, SettingsField, SettingsForm};
pub use notifications::{Notifications, Toast, ToastId, ToastLevel};
