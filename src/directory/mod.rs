//! Session directory: the list of sessions the hub currently offers.
//!
//! Refreshed on a timer and whenever the live feed reports a session change.
//! Like the fetch cache, it never performs I/O itself; callers ask whether a
//! listing request should be sent and report its result back.

use crate::model::{HubError, SessionId, SessionInfo};
use std::time::Duration;
use tracing::debug;

/// Interval between directory polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10_000);

/// Result of applying a listing response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryOutcome {
    /// The list was replaced.
    Updated {
        /// Sessions now listed.
        count: usize,
    },
    /// The request failed; the previous list is kept.
    Failed(HubError),
}

/// Session list plus the sidebar cursor.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    sessions: Vec<SessionInfo>,
    selected: usize,
    loaded: bool,
    in_flight: bool,
    queued: bool,
}

impl SessionDirectory {
    /// Create an empty, never-loaded directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a refresh.
    ///
    /// Returns `true` when the caller should send a listing request now.
    /// While one is outstanding, further requests collapse into a single
    /// follow-up issued by [`take_queued`](Self::take_queued).
    pub fn request_refresh(&mut self) -> bool {
        if self.in_flight {
            self.queued = true;
            return false;
        }
        self.in_flight = true;
        true
    }

    /// After [`complete`](Self::complete): whether a coalesced refresh should
    /// be sent now.
    pub fn take_queued(&mut self) -> bool {
        if !self.queued || self.in_flight {
            return false;
        }
        self.queued = false;
        self.in_flight = true;
        true
    }

    /// Apply a listing response.
    pub fn complete(&mut self, result: Result<Vec<SessionInfo>, HubError>) -> DirectoryOutcome {
        self.in_flight = false;
        match result {
            Ok(sessions) => {
                self.replace(sessions);
                DirectoryOutcome::Updated {
                    count: self.sessions.len(),
                }
            }
            Err(error) => DirectoryOutcome::Failed(error),
        }
    }

    fn replace(&mut self, sessions: Vec<SessionInfo>) {
        let previously_selected = self.selected().map(|info| info.id.clone());
        self.sessions = sessions;
        self.loaded = true;

        self.selected = previously_selected
            .and_then(|id| self.position(&id))
            .unwrap_or(self.selected)
            .min(self.sessions.len().saturating_sub(1));
        debug!(count = self.sessions.len(), "Session directory updated");
    }

    /// Listed sessions in hub order.
    pub fn sessions(&self) -> &[SessionInfo] {
        &self.sessions
    }

    /// Number of listed sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Whether at least one listing has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a listing request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Index of the sidebar cursor.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Session under the sidebar cursor.
    pub fn selected(&self) -> Option<&SessionInfo> {
        self.sessions.get(self.selected)
    }

    /// Position of `id` in the list.
    pub fn position(&self, id: &SessionId) -> Option<usize> {
        self.sessions.iter().position(|info| &info.id == id)
    }

    /// Move the cursor down, stopping at the last entry.
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.sessions.len() {
            self.selected += 1;
        }
    }

    /// Move the cursor up, stopping at the first entry.
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Move the cursor to the first entry.
    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    /// Move the cursor to the last entry.
    pub fn select_last(&mut self) {
        self.selected = self.sessions.len().saturating_sub(1);
    }
}
