//! Rendered message nodes.
//!
//! A [`MessageBubble`] is the structured form of one record as it appears in
//! the chat pane: role, local time, body lines and a truncation decision. The
//! view layer maps bubbles to terminal widgets; nothing here knows about
//! styling.

use super::wrap::wrap_line;
use crate::model::{MessageRecord, Role};

/// Label on the toggle of a collapsed bubble.
pub const SHOW_MORE: &str = "Show More";
/// Label on the toggle of an expanded bubble.
pub const SHOW_LESS: &str = "Show Less";

/// Whether a bubble body is height-capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// Body fits within the limit; no toggle is shown.
    Fits,
    /// Body exceeds `max_lines`.
    Capped {
        /// Number of lines shown while collapsed.
        max_lines: usize,
        /// Whether the reader expanded the body.
        expanded: bool,
    },
}

impl Truncation {
    /// Truncation decision for a body of `line_count` lines.
    ///
    /// Bodies strictly longer than `max_lines` start collapsed.
    pub fn decide(line_count: usize, max_lines: usize) -> Self {
        if line_count > max_lines {
            Truncation::Capped {
                max_lines,
                expanded: false,
            }
        } else {
            Truncation::Fits
        }
    }

    /// Whether the body is currently cut short.
    pub fn is_collapsed(&self) -> bool {
        matches!(self, Truncation::Capped { expanded: false, .. })
    }

    /// Whether a toggle is offered at all.
    pub fn is_truncatable(&self) -> bool {
        matches!(self, Truncation::Capped { .. })
    }

    /// Flip between collapsed and expanded. Returns `false` when the body
    /// fits and there is nothing to toggle.
    pub fn toggle(&mut self) -> bool {
        match self {
            Truncation::Fits => false,
            Truncation::Capped { expanded, .. } => {
                *expanded = !*expanded;
                true
            }
        }
    }

    /// Toggle label, if a toggle is shown.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Truncation::Fits => None,
            Truncation::Capped {
                expanded: false, ..
            } => Some(SHOW_MORE),
            Truncation::Capped { expanded: true, .. } => Some(SHOW_LESS),
        }
    }

    /// How many of `total` lines are visible.
    pub fn visible_lines(&self, total: usize) -> usize {
        match self {
            Truncation::Capped {
                max_lines,
                expanded: false,
            } => total.min(*max_lines),
            _ => total,
        }
    }
}

/// One row of a laid-out bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleRow {
    /// Role label and time.
    Header,
    /// One wrapped row of body text.
    Body(String),
    /// The "Show More"/"Show Less" affordance.
    Toggle(&'static str),
    /// Blank row separating bubbles.
    Spacer,
}

/// Structured rendering of one eligible record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBubble {
    index: usize,
    role: Role,
    time: String,
    lines: Vec<String>,
    truncation: Truncation,
}

impl MessageBubble {
    /// Build the bubble for the record at position `index`.
    pub fn from_record(index: usize, record: &MessageRecord, max_lines: usize) -> Self {
        let lines: Vec<String> = record.text().split('\n').map(str::to_string).collect();
        let truncation = Truncation::decide(lines.len(), max_lines);
        Self {
            index,
            role: record.role().clone(),
            time: record.timestamp().local_time(),
            lines,
            truncation,
        }
    }

    /// Position of the record among eligible records.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Author role.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Upper-cased role label for the header.
    pub fn role_label(&self) -> String {
        self.role.as_str().to_uppercase()
    }

    /// Local time of the record (`HH:MM:SS`).
    pub fn time(&self) -> &str {
        &self.time
    }

    /// All logical body lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Current truncation state.
    pub fn truncation(&self) -> Truncation {
        self.truncation
    }

    /// Body lines currently visible.
    pub fn visible_lines(&self) -> &[String] {
        &self.lines[..self.truncation.visible_lines(self.lines.len())]
    }

    /// Flip expand/collapse. Returns `false` if the bubble has no toggle.
    pub fn toggle_expand(&mut self) -> bool {
        self.truncation.toggle()
    }

    /// Lay the bubble out at the given body width.
    pub fn rows(&self, width: usize) -> Vec<BubbleRow> {
        let mut rows = vec![BubbleRow::Header];
        rows.extend(
            self.visible_lines()
                .iter()
                .flat_map(|line| wrap_line(line, width))
                .map(BubbleRow::Body),
        );
        if let Some(label) = self.truncation.label() {
            rows.push(BubbleRow::Toggle(label));
        }
        rows.push(BubbleRow::Spacer);
        rows
    }

    /// Number of rows [`rows`](Self::rows) produces at `width`.
    pub fn height(&self, width: usize) -> usize {
        let body: usize = self
            .visible_lines()
            .iter()
            .map(|line| wrap_line(line, width).len())
            .sum();
        let toggle = usize::from(self.truncation.is_truncatable());
        body + toggle + 2
    }
}
