//! Incremental rendering of a session into message bubbles.
//!
//! The engine reconciles what it has already rendered against a freshly
//! fetched copy of the session content. A full render rebuilds every bubble;
//! an incremental render parses the content, and when it holds more eligible
//! records than were rendered last time, appends only the new ones. Existing
//! bubbles (and their expand/collapse state) are never touched by an append.
//!
//! The engine also owns the chat viewport: scroll position, auto-scroll pin
//! and the focused bubble.

pub mod bubble;
pub mod wrap;

pub use bubble::{BubbleRow, MessageBubble, Truncation, SHOW_LESS, SHOW_MORE};

use crate::parser::parse_records;
use tracing::debug;

/// Text of the empty-state placeholder.
pub const EMPTY_PLACEHOLDER: &str = "No messages in this session";

/// Default maximum visible lines per bubble.
pub const DEFAULT_MAX_LINES: usize = 20;

/// Lower bound for the per-bubble line limit.
pub const MIN_MAX_LINES: usize = 1;

/// Upper bound for the per-bubble line limit.
pub const MAX_MAX_LINES: usize = 1000;

/// How a render reconciles with earlier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Discard everything and render from the first record.
    Full,
    /// Append records past the last rendered count.
    Incremental,
}

/// What a render call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Output was rebuilt with `count` bubbles (0 shows the placeholder).
    Replaced {
        /// Bubbles after the render.
        count: usize,
    },
    /// Records `[from, to)` were appended.
    Appended {
        /// First appended index.
        from: usize,
        /// One past the last appended index.
        to: usize,
    },
    /// No new records; output untouched.
    Unchanged,
    /// The content holds fewer records than already rendered; output untouched.
    Shrunk {
        /// Records rendered before.
        rendered: usize,
        /// Records in the new content.
        available: usize,
    },
}

/// Chat viewport scroll state.
///
/// `Bottom` follows the newest content as it grows; `AtLine` stays put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPosition {
    /// Pinned to the newest content.
    #[default]
    Bottom,
    /// Fixed offset from the top, in rows.
    AtLine(usize),
}

impl ScrollPosition {
    /// Resolve to a top-row offset, clamped so the viewport is never blank.
    pub fn resolve(&self, total_height: usize, viewport_height: usize) -> usize {
        let max_offset = total_height.saturating_sub(viewport_height);
        match self {
            ScrollPosition::Bottom => max_offset,
            ScrollPosition::AtLine(line) => (*line).min(max_offset),
        }
    }
}

/// Size of the chat body area, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Width available to body text.
    pub width: usize,
    /// Visible rows.
    pub height: usize,
}

/// Render state for one session view.
#[derive(Debug, Clone)]
pub struct RenderEngine {
    bubbles: Vec<MessageBubble>,
    show_placeholder: bool,
    last_rendered_count: usize,
    max_lines: usize,
    auto_scroll: bool,
    scroll: ScrollPosition,
    focused: Option<usize>,
    viewport: Viewport,
}

impl RenderEngine {
    /// Create an engine with nothing rendered.
    pub fn new(max_lines: usize, auto_scroll: bool) -> Self {
        Self {
            bubbles: Vec::new(),
            show_placeholder: false,
            last_rendered_count: 0,
            max_lines: max_lines.clamp(MIN_MAX_LINES, MAX_MAX_LINES),
            auto_scroll,
            scroll: Self::initial_scroll(auto_scroll),
            focused: None,
            viewport: Viewport::default(),
        }
    }

    // ===== Rendering =====

    /// Reconcile output with `content`.
    pub fn render(&mut self, content: &str, mode: RenderMode) -> RenderOutcome {
        let outcome = match mode {
            RenderMode::Full => self.render_full(content),
            RenderMode::Incremental => self.render_incremental(content),
        };

        if matches!(
            outcome,
            RenderOutcome::Replaced { .. } | RenderOutcome::Appended { .. }
        ) && self.auto_scroll
        {
            self.scroll = ScrollPosition::Bottom;
        }
        outcome
    }

    fn render_full(&mut self, content: &str) -> RenderOutcome {
        let max_lines = self.max_lines;
        self.bubbles = parse_records(content)
            .enumerate()
            .map(|(index, record)| MessageBubble::from_record(index, &record, max_lines))
            .collect();
        let count = self.bubbles.len();

        self.last_rendered_count = count;
        self.show_placeholder = count == 0;
        self.focused = self.focused.filter(|&index| index < count);

        debug!(count, "Full render");
        RenderOutcome::Replaced { count }
    }

    fn render_incremental(&mut self, content: &str) -> RenderOutcome {
        let records = parse_records(content);
        let available = records.clone().count();
        let rendered = self.last_rendered_count;

        if available == rendered {
            return RenderOutcome::Unchanged;
        }
        if available < rendered {
            debug!(rendered, available, "Session shrank; keeping rendered output");
            return RenderOutcome::Shrunk {
                rendered,
                available,
            };
        }

        let max_lines = self.max_lines;
        self.bubbles.extend(
            records
                .enumerate()
                .skip(rendered)
                .map(|(index, record)| MessageBubble::from_record(index, &record, max_lines)),
        );
        self.show_placeholder = false;
        self.last_rendered_count = available;

        debug!(from = rendered, to = available, "Appended new messages");
        RenderOutcome::Appended {
            from: rendered,
            to: available,
        }
    }

    /// Discard all output and return to the never-rendered state.
    pub fn clear(&mut self) {
        self.bubbles.clear();
        self.show_placeholder = false;
        self.last_rendered_count = 0;
        self.focused = None;
        self.scroll = Self::initial_scroll(self.auto_scroll);
    }

    fn initial_scroll(auto_scroll: bool) -> ScrollPosition {
        if auto_scroll {
            ScrollPosition::Bottom
        } else {
            ScrollPosition::AtLine(0)
        }
    }

    /// Records rendered so far.
    pub fn last_rendered_count(&self) -> usize {
        self.last_rendered_count
    }

    /// Rendered bubbles in record order.
    pub fn bubbles(&self) -> &[MessageBubble] {
        &self.bubbles
    }

    /// Whether the empty-state placeholder is showing.
    pub fn shows_placeholder(&self) -> bool {
        self.show_placeholder
    }

    // ===== Truncation =====

    /// Current per-bubble line limit.
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Change the per-bubble line limit.
    ///
    /// Returns `true` when the limit actually changed. Existing truncation
    /// decisions are stale afterwards; the owner must issue a full render.
    pub fn set_max_lines(&mut self, max_lines: usize) -> bool {
        let max_lines = max_lines.clamp(MIN_MAX_LINES, MAX_MAX_LINES);
        if max_lines == self.max_lines {
            return false;
        }
        self.max_lines = max_lines;
        true
    }

    /// Toggle expand/collapse on the bubble at `index`.
    pub fn toggle_expand(&mut self, index: usize) -> bool {
        self.bubbles
            .get_mut(index)
            .is_some_and(MessageBubble::toggle_expand)
    }

    /// Toggle expand/collapse on the focused bubble.
    pub fn toggle_focused(&mut self) -> bool {
        match self.focused {
            Some(index) => self.toggle_expand(index),
            None => false,
        }
    }

    // ===== Focus =====

    /// Index of the focused bubble.
    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Focus the next bubble, wrapping to the first.
    pub fn focus_next(&mut self) {
        let count = self.bubbles.len();
        if count == 0 {
            return;
        }
        let next = match self.focused {
            Some(index) if index + 1 < count => index + 1,
            Some(_) => 0,
            None => self.first_visible_bubble(),
        };
        self.focus(next);
    }

    /// Focus the previous bubble, wrapping to the last.
    pub fn focus_prev(&mut self) {
        let count = self.bubbles.len();
        if count == 0 {
            return;
        }
        let prev = match self.focused {
            Some(0) => count - 1,
            Some(index) => index - 1,
            None => self.last_visible_bubble(),
        };
        self.focus(prev);
    }

    fn focus(&mut self, index: usize) {
        self.focused = Some(index);
        self.ensure_visible(index);
    }

    // ===== Scrolling =====

    /// Update the body area size.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Current body area size.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether renders pin the view to the newest content.
    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    /// Enable or disable auto-scroll. Enabling pins to the bottom at once.
    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.auto_scroll = enabled;
        if enabled {
            self.scroll = ScrollPosition::Bottom;
        }
    }

    /// Current scroll state.
    pub fn scroll(&self) -> ScrollPosition {
        self.scroll
    }

    /// Total laid-out height at the current viewport width.
    pub fn total_height(&self) -> usize {
        let width = self.viewport.width;
        self.bubbles.iter().map(|bubble| bubble.height(width)).sum()
    }

    /// Resolved top-row offset for drawing.
    pub fn scroll_offset(&self) -> usize {
        self.scroll
            .resolve(self.total_height(), self.viewport.height)
    }

    /// Scroll up by `rows`, unpinning from the bottom.
    pub fn scroll_up(&mut self, rows: usize) {
        let offset = self.scroll_offset();
        self.scroll = ScrollPosition::AtLine(offset.saturating_sub(rows));
    }

    /// Scroll down by `rows`. Reaching the end re-pins to the bottom.
    pub fn scroll_down(&mut self, rows: usize) {
        let max_offset = self.total_height().saturating_sub(self.viewport.height);
        let target = self.scroll_offset().saturating_add(rows);
        self.scroll = if target >= max_offset {
            ScrollPosition::Bottom
        } else {
            ScrollPosition::AtLine(target)
        };
    }

    /// Scroll by one viewport height.
    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport.height.max(1));
    }

    /// Scroll by one viewport height.
    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport.height.max(1));
    }

    /// Jump to the first row.
    pub fn scroll_to_top(&mut self) {
        self.scroll = ScrollPosition::AtLine(0);
    }

    /// Jump to and pin the newest content.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = ScrollPosition::Bottom;
    }

    fn bubble_top(&self, index: usize) -> usize {
        let width = self.viewport.width;
        self.bubbles[..index.min(self.bubbles.len())]
            .iter()
            .map(|bubble| bubble.height(width))
            .sum()
    }

    fn ensure_visible(&mut self, index: usize) {
        let Some(bubble) = self.bubbles.get(index) else {
            return;
        };
        let top = self.bubble_top(index);
        let bottom = top + bubble.height(self.viewport.width);
        let offset = self.scroll_offset();
        let height = self.viewport.height;

        if top < offset {
            self.scroll = ScrollPosition::AtLine(top);
        } else if bottom > offset + height {
            let target = bottom.saturating_sub(height).min(top);
            let max_offset = self.total_height().saturating_sub(height);
            self.scroll = if target >= max_offset {
                ScrollPosition::Bottom
            } else {
                ScrollPosition::AtLine(target)
            };
        }
    }

    fn first_visible_bubble(&self) -> usize {
        let offset = self.scroll_offset();
        let width = self.viewport.width;
        let mut top = 0;
        for (index, bubble) in self.bubbles.iter().enumerate() {
            let bottom = top + bubble.height(width);
            if bottom > offset {
                return index;
            }
            top = bottom;
        }
        0
    }

    fn last_visible_bubble(&self) -> usize {
        let limit = self.scroll_offset() + self.viewport.height;
        let width = self.viewport.width;
        let mut top = 0;
        let mut last = 0;
        for (index, bubble) in self.bubbles.iter().enumerate() {
            if top >= limit {
                break;
            }
            last = index;
            top += bubble.height(width);
        }
        last
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
