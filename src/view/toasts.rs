//! Toast notifications stacked in the top-right corner.

use super::constants::TOAST_WIDTH;
use super::styles::toast_color;
use crate::state::Notifications;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const TOAST_HEIGHT: u16 = 3;

/// Render every toast, newest at the bottom of the stack.
pub fn render_toasts(frame: &mut Frame, notifications: &Notifications) {
    let area = frame.area();
    for (slot, toast) in notifications.toasts().iter().enumerate() {
        let Some(rect) = toast_area(area, slot) else {
            break;
        };
        let style = Style::default().fg(toast_color(toast.level));
        let widget = Paragraph::new(toast.message.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(format!(" {} ", toast.level))
                    .borders(Borders::ALL)
                    .border_style(style),
            );
        frame.render_widget(Clear, rect);
        frame.render_widget(widget, rect);
    }
}

/// Area of the toast in stack position `slot`, if it fits on screen.
pub fn toast_area(screen: Rect, slot: usize) -> Option<Rect> {
    let width = TOAST_WIDTH.min(screen.width);
    let y = screen.y + 1 + u16::try_from(slot).ok()?.checked_mul(TOAST_HEIGHT)?;
    if y + TOAST_HEIGHT > screen.bottom() {
        return None;
    }
    Some(Rect {
        x: screen.right().saturating_sub(width + 1),
        y,
        width,
        height: TOAST_HEIGHT,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_stack_downwards_from_top_right() {
        let screen = Rect::new(0, 0, 100, 30);
        let first = toast_area(screen, 0).unwrap();
        let second = toast_area(screen, 1).unwrap();

        assert_eq!(first.right(), 99);
        assert_eq!(first.y, 1);
        assert_eq!(second.y, 1 + TOAST_HEIGHT);
    }

    #[test]
    fn toasts_beyond_screen_are_skipped() {
        let screen = Rect::new(0, 0, 100, 7);
        assert!(toast_area(screen, 0).is_some());
        assert!(toast_area(screen, 1).is_some());
        assert!(toast_area(screen, 2).is_none());
    }
}
