//! Display-width line wrapping.

use unicode_width::UnicodeWidthChar;

/// Split one logical line into rows no wider than `width` columns.
///
/// Breaks fall between characters; a wide character that does not fit on the
/// current row moves to the next one. An empty line yields one empty row, and
/// a zero width disables wrapping.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 || line.is_empty() {
        return vec![line.to_string()];
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for ch in line.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }
    rows.push(current);
    rows
}
