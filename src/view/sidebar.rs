//! Session list sidebar.

use super::styles::{FOCUSED_BORDER, MUTED_TEXT, SELECTED_ROW, UNFOCUSED_BORDER};
use crate::model::SessionInfo;
use crate::state::{AppState, FocusPane};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Shown when the hub lists no sessions.
pub const NO_SESSIONS: &str = "No active sessions";

/// Shown until the first listing arrives.
pub const LOADING_SESSIONS: &str = "Loading sessions...";

/// Render the sidebar.
pub fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let directory = state.directory();
    let border_style = if state.focus == FocusPane::Sidebar {
        FOCUSED_BORDER
    } else {
        UNFOCUSED_BORDER
    };
    let block = Block::default()
        .title(format!(" Sessions ({}) ", directory.count()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if directory.sessions().is_empty() {
        let text = if directory.is_loaded() {
            NO_SESSIONS
        } else {
            LOADING_SESSIONS
        };
        let empty = Paragraph::new(Line::from(Span::styled(text, MUTED_TEXT))).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let active = state.active_session();
    let items: Vec<ListItem> = directory
        .sessions()
        .iter()
        .map(|info| session_item(info, active == Some(&info.id)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(SELECTED_ROW);
    let mut list_state = ListState::default().with_selected(Some(directory.selected_index()));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn session_item(info: &SessionInfo, active: bool) -> ListItem<'static> {
    let marker = if active {
        Span::styled("● ", Style::default().fg(Color::Green))
    } else {
        Span::raw("  ")
    };
    let title_style = if active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    ListItem::new(vec![
        Line::from(vec![
            marker,
            Span::styled(info.display_title().to_string(), title_style),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("{}  {}", info.display_size(), info.modified.local_date_time()),
                MUTED_TEXT,
            ),
        ]),
    ])
}
