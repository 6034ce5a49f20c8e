//! Settings form and emergency stop confirmation dialogs.

use super::constants::DIALOG_WIDTH;
use super::styles::MUTED_TEXT;
use crate::state::modal::STOP_CONFIRMATION;
use crate::state::{SettingsField, SettingsForm, TextInput};
use ratatui::{
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Dialog rectangle of `height` rows, centered in `area`.
pub fn centered_dialog(area: Rect, height: u16) -> Rect {
    let width = DIALOG_WIDTH.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn field_line(label: &'static str, input: &TextInput, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(label, label_style),
        Span::raw(input.value().to_string()),
    ])
}

/// Render the hub address form.
pub fn render_settings(frame: &mut Frame, form: &SettingsForm) {
    const HOST_LABEL: &str = "Hub IP:   ";
    const PORT_LABEL: &str = "Hub port: ";

    let area = centered_dialog(frame.area(), 7);
    let lines = vec![
        field_line(HOST_LABEL, &form.host, form.field == SettingsField::Host),
        field_line(PORT_LABEL, &form.port, form.field == SettingsField::Port),
        Line::default(),
        Line::from(Span::styled(
            "Enter save & reconnect  Tab switch  Esc cancel",
            MUTED_TEXT,
        )),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Settings ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );

    let (row, input) = match form.field {
        SettingsField::Host => (0, &form.host),
        SettingsField::Port => (1, &form.port),
    };
    let column = HOST_LABEL.len() + input.cursor();
    if area.width > 2 && area.height > 2 {
        let column = u16::try_from(column).unwrap_or(u16::MAX);
        let x = (area.x + 1).saturating_add(column).min(area.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, area.y + 1 + row));
    }
}

/// Render the emergency stop confirmation.
pub fn render_stop_confirmation(frame: &mut Frame) {
    let area = centered_dialog(frame.area(), 7);
    let lines = vec![
        Line::from(Span::styled(
            STOP_CONFIRMATION,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" stop   "),
            Span::styled("n", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(" Emergency Stop ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        ),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_is_centered() {
        let dialog = centered_dialog(Rect::new(0, 0, 100, 31), 7);
        assert_eq!(dialog, Rect::new(22, 12, DIALOG_WIDTH, 7));
    }

    #[test]
    fn dialog_shrinks_to_small_screens() {
        let dialog = centered_dialog(Rect::new(0, 0, 20, 4), 7);
        assert_eq!(dialog, Rect::new(0, 0, 20, 4));
    }
}
