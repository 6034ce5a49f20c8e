//! Active session content and the single-flight fetch protocol.
//!
//! [`FetchCache`] owns the one [`SessionView`] being displayed and a marker
//! for the one content fetch allowed in flight at a time. It never performs
//! I/O: [`FetchCache::refresh`] hands out a [`FetchTicket`] describing the
//! request to make, and the result comes back through
//! [`FetchCache::complete`].
//!
//! Tickets carry the view generation they were issued for, so a response
//! for a session the operator has already left is recognised and dropped
//! instead of overwriting the new session's state.

use crate::model::{HubError, SessionId};
use crate::render::{RenderEngine, RenderMode, RenderOutcome};
use tracing::debug;

/// A content fetch the runtime must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    session: SessionId,
    generation: u64,
    mode: RenderMode,
}

impl FetchTicket {
    /// Session to fetch.
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// View generation the ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Render mode to apply to the result.
    pub fn mode(&self) -> RenderMode {
        self.mode
    }
}

/// Result of applying a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Content replaced and rendered.
    Rendered(RenderOutcome),
    /// Incremental fetch returned byte-identical content; nothing done.
    Unchanged,
    /// The ticket belonged to a view that is no longer active.
    ///
    /// `follow_up` is the deferred initial load of the current view, if one
    /// was suppressed while the stale fetch was in flight.
    Stale {
        /// Fetch to issue next.
        follow_up: Option<FetchTicket>,
    },
    /// The fetch failed; cached content is untouched.
    Failed(HubError),
}

/// Display context for one selected session.
///
/// Created when a session is selected and replaced wholesale on the next
/// selection, so nothing from the previous session can leak into it.
#[derive(Debug, Clone)]
pub struct SessionView {
    id: SessionId,
    generation: u64,
    content: Option<String>,
    engine: RenderEngine,
}

impl SessionView {
    fn new(id: SessionId, generation: u64, engine: RenderEngine) -> Self {
        Self {
            id,
            generation,
            content: None,
            engine,
        }
    }

    /// Session shown by this view.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Generation counter distinguishing repeated selections.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cached raw content, once a fetch has succeeded.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Render state.
    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    /// Mutable render state (scrolling, focus, expand toggles).
    pub fn engine_mut(&mut self) -> &mut RenderEngine {
        &mut self.engine
    }

    fn owns(&self, ticket: &FetchTicket) -> bool {
        self.id == ticket.session && self.generation == ticket.generation
    }
}

/// Single authoritative copy of the active session's content.
#[derive(Debug)]
pub struct FetchCache {
    view: Option<SessionView>,
    in_flight: Option<FetchTicket>,
    deferred_initial: bool,
    next_generation: u64,
    max_lines: usize,
    auto_scroll: bool,
}

impl FetchCache {
    /// Create a cache with no active session.
    ///
    /// `max_lines` and `auto_scroll` seed every view created later.
    pub fn new(max_lines: usize, auto_scroll: bool) -> Self {
        Self {
            view: None,
            in_flight: None,
            deferred_initial: false,
            next_generation: 0,
            max_lines,
            auto_scroll,
        }
    }

    /// The active view.
    pub fn view(&self) -> Option<&SessionView> {
        self.view.as_ref()
    }

    /// The active view, mutably.
    pub fn view_mut(&mut self) -> Option<&mut SessionView> {
        self.view.as_mut()
    }

    /// Id of the active session.
    pub fn active_id(&self) -> Option<&SessionId> {
        self.view.as_ref().map(SessionView::id)
    }

    /// Whether a fetch is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Make `id` the active session and request its initial full load.
    ///
    /// The previous view is discarded even when `id` is the same session, so
    /// reselecting reloads from scratch. Returns `None` when another fetch is
    /// in flight; the load is then issued once that fetch completes.
    pub fn select(&mut self, id: SessionId) -> Option<FetchTicket> {
        self.switch_to(id);
        let ticket = self.issue(RenderMode::Full);
        if ticket.is_none() {
            self.deferred_initial = true;
        }
        ticket
    }

    /// Request a refresh of `id`.
    ///
    /// Returns `None` while another fetch is in flight. A refresh of a
    /// session other than the active one switches to it first and always
    /// renders in full.
    pub fn refresh(&mut self, id: &SessionId, mode: RenderMode) -> Option<FetchTicket> {
        if let Some(pending) = &self.in_flight {
            debug!(
                session = %id,
                in_flight = %pending.session,
                "Fetch already in flight; refresh skipped"
            );
            return None;
        }

        let mode = if self.active_id() == Some(id) {
            mode
        } else {
            self.switch_to(id.clone());
            RenderMode::Full
        };
        self.issue(mode)
    }

    /// Refresh the active session, if any.
    pub fn refresh_active(&mut self, mode: RenderMode) -> Option<FetchTicket> {
        let id = self.active_id()?.clone();
        self.refresh(&id, mode)
    }

    /// Apply the result of the fetch described by `ticket`.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<String, HubError>,
    ) -> FetchOutcome {
        if self.in_flight.as_ref() == Some(ticket) {
            self.in_flight = None;
        }

        let owned = self.view.as_ref().is_some_and(|view| view.owns(ticket));
        if !owned {
            debug!(session = %ticket.session, "Discarding fetch result for inactive view");
            let follow_up = if self.deferred_initial {
                self.issue(RenderMode::Full)
            } else {
                None
            };
            return FetchOutcome::Stale { follow_up };
        }
        let Some(view) = self.view.as_mut() else {
            return FetchOutcome::Stale { follow_up: None };
        };

        let content = match result {
            Ok(content) => content,
            Err(error) => return FetchOutcome::Failed(error),
        };

        if ticket.mode == RenderMode::Incremental && view.content.as_deref() == Some(&content) {
            debug!(session = %ticket.session, "Session content unchanged");
            return FetchOutcome::Unchanged;
        }

        let view_content = view.content.insert(content);
        FetchOutcome::Rendered(view.engine.render(view_content, ticket.mode))
    }

    /// Change the per-bubble line limit for the active and future views.
    ///
    /// When the active view has cached content it is re-rendered in full,
    /// which resets every expand/collapse decision.
    pub fn set_max_lines(&mut self, max_lines: usize) -> bool {
        self.max_lines = max_lines;
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        if !view.engine.set_max_lines(max_lines) {
            return false;
        }
        if let Some(content) = view.content.as_deref() {
            view.engine.render(content, RenderMode::Full);
        }
        true
    }

    /// Current per-bubble line limit.
    pub fn max_lines(&self) -> usize {
        self.view
            .as_ref()
            .map_or(self.max_lines, |view| view.engine.max_lines())
    }

    /// Toggle auto-scroll for the active and future views.
    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.auto_scroll = enabled;
        if let Some(view) = self.view.as_mut() {
            view.engine.set_auto_scroll(enabled);
        }
    }

    /// Whether auto-scroll is enabled.
    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    fn switch_to(&mut self, id: SessionId) {
        let generation = self.next_generation;
        self.next_generation += 1;
        debug!(session = %id, generation, "Switching active session");

        let mut engine = RenderEngine::new(self.max_lines, self.auto_scroll);
        if let Some(previous) = &self.view {
            engine.set_viewport(previous.engine.viewport());
        }
        self.view = Some(SessionView::new(id, generation, engine));
    }

    fn issue(&mut self, mode: RenderMode) -> Option<FetchTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        let view = self.view.as_ref()?;
        let ticket = FetchTicket {
            session: view.id.clone(),
            generation: view.generation,
            mode,
        };
        self.deferred_initial = false;
        self.in_flight = Some(ticket.clone());
        Some(ticket)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
