//! Help overlay widget displaying keyboard shortcuts.
//!
//! Shows a centered modal overlay with all keyboard shortcuts grouped by category.
//! Triggered by '?' key, dismissed by any key.

use super::constants::{HELP_POPUP_HEIGHT_PERCENT, HELP_POPUP_WIDTH_PERCENT};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Shortcut groups: category, then (keys, description) pairs.
const SHORTCUTS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/↓  k/↑", "Move in sidebar / scroll chat"),
            ("Ctrl+d/PgDn", "Page down"),
            ("Ctrl+u/PgUp", "Page up"),
            ("g/Home  G/End", "Top / bottom"),
            ("Tab", "Switch between sidebar and chat"),
        ],
    ),
    (
        "Messages",
        &[
            ("Enter", "Open session / toggle Show More"),
            ("Ctrl+j  Ctrl+k", "Focus next / previous message"),
            ("Space", "Toggle Show More / Show Less"),
            ("+  -", "More / fewer lines per message"),
            ("a", "Toggle auto-scroll"),
        ],
    ),
    (
        "Hub",
        &[
            ("i", "Write a message (Enter send, Esc leave)"),
            ("X", "Emergency stop (asks first)"),
            ("e", "Export session to HTML"),
            ("t", "Test connection"),
            ("s", "Settings (hub address)"),
            ("r", "Refresh session list"),
            ("R", "Reconnect live feed"),
        ],
    ),
    ("Application", &[("?", "This help"), ("q/Ctrl+c", "Quit")]),
];

/// Render the help overlay centered on the screen.
pub fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();
    let popup_area = centered_rect(HELP_POPUP_WIDTH_PERCENT, HELP_POPUP_HEIGHT_PERCENT, area);

    frame.render_widget(Clear, popup_area);

    let help_paragraph = Paragraph::new(build_help_content())
        .block(
            Block::default()
                .title(" Keyboard Shortcuts ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(1),
        width: popup_area.width,
        height: 1,
    };
    let hint = Paragraph::new(Line::from(vec![Span::styled(
        " Press any key to close ",
        super::styles::MUTED_TEXT,
    )]))
    .alignment(Alignment::Center);

    frame.render_widget(hint, hint_area);
}

/// Centered rect taking the given percentages of `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_width = area.width * percent_x / 100;
    let popup_height = area.height * percent_y / 100;
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    Rect {
        x: area.x + popup_x,
        y: area.y + popup_y,
        width: popup_width,
        height: popup_height,
    }
}

/// Build the help content lines grouped by category.
fn build_help_content() -> Vec<Line<'static>> {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(Color::White);

    let mut lines = Vec::new();
    for (index, (category, entries)) in SHORTCUTS.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(*category, super::styles::SECTION_HEADER)));
        for (keys, description) in entries.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<16}"), key_style),
                Span::styled(*description, desc_style),
            ]));
        }
    }
    lines
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
