//! Colors and text styles shared by the widgets.

use crate::feed::ConnectionState;
use crate::model::Role;
use crate::state::ToastLevel;
use ratatui::style::{Color, Modifier, Style};

/// Dimmed secondary text (timestamps, hints, placeholders).
pub const MUTED_TEXT: Style = Style::new().fg(Color::DarkGray);

/// Category headers in the help overlay.
pub const SECTION_HEADER: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);

/// Border of the focused pane.
pub const FOCUSED_BORDER: Style = Style::new().fg(Color::Cyan);

/// Border of an unfocused pane.
pub const UNFOCUSED_BORDER: Style = Style::new().fg(Color::DarkGray);

/// Sidebar row under the cursor.
pub const SELECTED_ROW: Style = Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD);

/// Show More / Show Less affordance.
pub const TOGGLE_TEXT: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::UNDERLINED);

/// Accent color for a message author.
pub fn role_color(role: &Role) -> Color {
    match role {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Green,
        Role::System => Color::Magenta,
        Role::Other(_) => Color::Yellow,
        Role::Unknown => Color::Gray,
    }
}

/// Color of a toast's border and label.
pub fn toast_color(level: ToastLevel) -> Color {
    match level {
        ToastLevel::Success => Color::Green,
        ToastLevel::Info => Color::Blue,
        ToastLevel::Warning => Color::Yellow,
        ToastLevel::Danger => Color::Red,
    }
}

/// Color of the connection indicator dot.
pub fn connection_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Disconnected => Color::Red,
    }
}
