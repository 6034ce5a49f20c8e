//! Screen layout and top-level rendering.
//!
//! Pure layout logic: splits the frame into sidebar, chat pane, composer and
//! status bar, then hands each area to its widget.

use super::constants::{BUBBLE_GUTTER, COMPOSER_HEIGHT, SIDEBAR_WIDTH, STATUS_BAR_HEIGHT};
use super::{chat, composer, dialogs, help, sidebar, status, toasts};
use crate::render::Viewport;
use crate::state::{AppState, Mode};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

/// Areas of the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    /// Session list.
    pub sidebar: Rect,
    /// Message bubbles.
    pub chat: Rect,
    /// Message input.
    pub composer: Rect,
    /// Bottom status line.
    pub status: Rect,
}

impl ScreenLayout {
    /// Split `area` into panes.
    ///
    /// Narrow terminals get a sidebar of at most a third of the width.
    pub fn new(area: Rect) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(STATUS_BAR_HEIGHT),
            ])
            .split(area);

        let sidebar_width = SIDEBAR_WIDTH.min(area.width / 3);
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(0)])
            .split(vertical[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(COMPOSER_HEIGHT)])
            .split(horizontal[1]);

        Self {
            sidebar: horizontal[0],
            chat: right[0],
            composer: right[1],
            status: vertical[1],
        }
    }

    /// Body text area of the chat pane: inside the border, after the gutter.
    pub fn chat_viewport(&self) -> Viewport {
        Viewport {
            width: usize::from(self.chat.width.saturating_sub(2 + BUBBLE_GUTTER)),
            height: usize::from(self.chat.height.saturating_sub(2)),
        }
    }
}

/// Render the whole screen, overlays last.
pub fn render_layout(frame: &mut Frame, state: &AppState) {
    let layout = ScreenLayout::new(frame.area());

    sidebar::render_sidebar(frame, layout.sidebar, state);
    chat::render_chat(frame, layout.chat, state);
    composer::render_composer(frame, layout.composer, state);
    status::render_status_bar(frame, layout.status, state);

    match state.mode() {
        Mode::Settings(form) => dialogs::render_settings(frame, form),
        Mode::ConfirmStop => dialogs::render_stop_confirmation(frame),
        Mode::Help => help::render_help_overlay(frame),
        Mode::Normal | Mode::Composing => {}
    }

    toasts::render_toasts(frame, state.notifications());
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
