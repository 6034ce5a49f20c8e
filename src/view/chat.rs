//! Chat pane: message bubbles of the active session.
//!
//! Maps the render engine's [`MessageBubble`]s to terminal lines. Only the
//! bubbles intersecting the visible window are laid out, so long sessions
//! cost no more to draw than short ones.

use super::styles::{role_color, FOCUSED_BORDER, MUTED_TEXT, TOGGLE_TEXT, UNFOCUSED_BORDER};
use crate::render::{BubbleRow, MessageBubble, RenderEngine, EMPTY_PLACEHOLDER};
use crate::state::{AppState, FocusPane};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Shown before any session is opened.
pub const NO_SESSION_HINT: &str = "Select a session and press Enter";

/// Render the chat pane.
pub fn render_chat(frame: &mut Frame, area: Rect, state: &AppState) {
    let border_style = if state.focus == FocusPane::Chat {
        FOCUSED_BORDER
    } else {
        UNFOCUSED_BORDER
    };
    let title = match state.active_session() {
        Some(id) => format!(" {id} "),
        None => " Chat ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let Some(view) = state.active_view() else {
        let hint = Paragraph::new(Line::from(Span::styled(NO_SESSION_HINT, MUTED_TEXT)))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let engine = view.engine();
    if engine.shows_placeholder() {
        let placeholder = Paragraph::new(Line::from(Span::styled(EMPTY_PLACEHOLDER, MUTED_TEXT)))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let paragraph = Paragraph::new(visible_lines(engine)).block(block);
    frame.render_widget(paragraph, area);
}

/// Lines in the engine's current scroll window.
pub fn visible_lines(engine: &RenderEngine) -> Vec<Line<'static>> {
    let viewport = engine.viewport();
    let offset = engine.scroll_offset();
    let end = offset + viewport.height;

    let mut lines = Vec::with_capacity(viewport.height);
    let mut top = 0;
    for bubble in engine.bubbles() {
        if top >= end {
            break;
        }
        let height = bubble.height(viewport.width);
        if top + height > offset {
            let focused = engine.focused() == Some(bubble.index());
            let rows = bubble_lines(bubble, viewport.width, focused);
            let skip = offset.saturating_sub(top);
            let take = end.saturating_sub(top.max(offset));
            lines.extend(rows.into_iter().skip(skip).take(take));
        }
        top += height;
    }
    lines
}

/// Lay out one bubble as styled lines.
pub fn bubble_lines(bubble: &MessageBubble, width: usize, focused: bool) -> Vec<Line<'static>> {
    let accent = Style::default().fg(role_color(bubble.role()));
    let gutter = if focused {
        Span::styled("┃ ", accent.add_modifier(Modifier::BOLD))
    } else {
        Span::styled("│ ", accent)
    };

    bubble
        .rows(width)
        .into_iter()
        .map(|row| match row {
            BubbleRow::Header => Line::from(vec![
                gutter.clone(),
                Span::styled(bubble.role_label(), accent.add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(bubble.time().to_string(), MUTED_TEXT),
            ]),
            BubbleRow::Body(text) => Line::from(vec![gutter.clone(), Span::raw(text)]),
            BubbleRow::Toggle(label) => Line::from(vec![
                gutter.clone(),
                Span::styled(format!("[{label}]"), TOGGLE_TEXT),
            ]),
            BubbleRow::Spacer => Line::default(),
        })
        .collect()
}
