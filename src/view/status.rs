//! Status bar with the feed connection indicator.

use super::styles::{connection_color, MUTED_TEXT};
use crate::feed::ConnectionState;
use crate::state::AppState;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Connection indicator: a colored dot and the state label.
///
/// Pure and stateless; the state is read from the feed controller each frame.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionIndicator {
    state: ConnectionState,
}

impl ConnectionIndicator {
    /// Indicator for `state`.
    pub fn new(state: ConnectionState) -> Self {
        Self { state }
    }

    /// Render as spans.
    pub fn render(&self) -> Vec<Span<'static>> {
        let style = Style::default().fg(connection_color(self.state));
        vec![
            Span::styled("● ", style),
            Span::styled(self.state.label(), style),
        ]
    }
}

/// Render the status bar.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = ConnectionIndicator::new(state.connection_state()).render();

    let auto_scroll = if state.cache().auto_scroll() { "on" } else { "off" };
    spans.push(Span::styled(
        format!(
            "  {}  max lines {}  auto-scroll {auto_scroll}",
            state.hub_address(),
            state.cache().max_lines(),
        ),
        MUTED_TEXT,
    ));
    spans.push(Span::styled("  ? help  q quit", MUTED_TEXT));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
