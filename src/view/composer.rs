//! Message composer line.

use super::styles::{FOCUSED_BORDER, MUTED_TEXT, UNFOCUSED_BORDER};
use crate::state::{AppState, Mode, TextInput};
use ratatui::{
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Shown in the empty composer while not typing.
pub const COMPOSER_HINT: &str = "Press i to write a message";

/// Render the composer. Places the terminal cursor while composing.
pub fn render_composer(frame: &mut Frame, area: Rect, state: &AppState) {
    let composing = state.mode() == &Mode::Composing;
    let block = Block::default()
        .title(if composing {
            " Message (Enter send, Esc leave) "
        } else {
            " Message "
        })
        .borders(Borders::ALL)
        .border_style(if composing {
            FOCUSED_BORDER
        } else {
            UNFOCUSED_BORDER
        });

    let input = state.composer();
    let inner_width = usize::from(area.width.saturating_sub(2));
    let (text, cursor_column) = visible_window(input, inner_width);

    let line = if input.value().is_empty() && !composing {
        Line::from(Span::styled(COMPOSER_HINT, MUTED_TEXT))
    } else {
        Line::from(text)
    };
    frame.render_widget(Paragraph::new(line).block(block), area);

    if composing && area.width > 2 && area.height > 2 {
        let column = u16::try_from(cursor_column).unwrap_or(u16::MAX);
        frame.set_cursor_position(Position::new(area.x + 1 + column, area.y + 1));
    }
}

/// The slice of `input` that fits in `width` columns with the cursor in
/// view, and the cursor's column within it.
pub fn visible_window(input: &TextInput, width: usize) -> (String, usize) {
    let chars: Vec<char> = input.value().chars().collect();
    let cursor = input.cursor().min(chars.len());
    if width == 0 {
        return (String::new(), 0);
    }

    // Scroll so the cursor sits on the last column when the text overflows.
    let mut start = 0;
    while UnicodeWidthStr::width(chars[start..cursor].iter().collect::<String>().as_str()) >= width
    {
        start += 1;
    }

    let mut visible = String::new();
    for ch in &chars[start..] {
        let mut candidate = visible.clone();
        candidate.push(*ch);
        if candidate.width() > width {
            break;
        }
        visible = candidate;
    }

    let column = chars[start..cursor].iter().collect::<String>().width();
    (visible, column)
}
