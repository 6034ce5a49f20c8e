//! Acceptance Test Harness for TUI testing
//!
//! Provides a high-level API for acceptance testing user stories by wrapping
//! TuiApp<TestBackend> with convenient methods for simulating user
//! interactions, plus [`FakeHub`], an in-memory hub the runtime talks to
//! instead of HTTP.

use crate::config::ConfigStore;
use crate::hub::{EventStream, HubAddress, HubApi};
use crate::model::{HubError, SessionId, SessionInfo, Timestamp};
use crate::runtime::Runtime;
use crate::state::AppState;
use crate::view::{TuiApp, TuiError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Convert a ratatui buffer to a string representation for snapshot testing.
///
/// Captures the visual output character by character, preserving layout.
/// Empty trailing lines are removed to keep snapshots clean.
pub fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
    let area = buffer.area();
    let mut lines = Vec::new();

    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            let cell = &buffer[(x, y)];
            line.push_str(cell.symbol());
        }
        let trimmed = line.trim_end();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}

/// NDJSON session content with one user message per text.
pub fn session_log(texts: &[&str]) -> String {
    texts
        .iter()
        .map(|text| {
            serde_json::json!({
                "type": "message",
                "timestamp": "2025-01-01T12:00:00Z",
                "message": { "role": "user", "content": text },
            })
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Directory entry for `id` with no title.
pub fn session_info(id: &str) -> SessionInfo {
    SessionInfo {
        id: SessionId::new(id).unwrap(),
        title: None,
        size: 2048,
        modified: Timestamp::unknown(),
    }
}

#[derive(Debug, Default)]
struct FakeHubState {
    sessions: Vec<SessionInfo>,
    contents: HashMap<SessionId, String>,
    sent: Vec<String>,
    stops: usize,
    failing: bool,
    feed_script: String,
}

/// In-memory [`HubApi`].
///
/// Every method answers from the shared state; `set_failing(true)` makes every
/// request fail with a transport error. The event stream replays
/// `feed_script` and then ends.
#[derive(Debug, Default)]
pub struct FakeHub {
    state: Mutex<FakeHubState>,
    requests: AtomicUsize,
}

impl FakeHub {
    /// Empty hub.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, FakeHubState> {
        self.state.lock().unwrap()
    }

    fn begin(&self, endpoint: &str) -> Result<MutexGuard<'_, FakeHubState>, HubError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let state = self.state();
        if state.failing {
            return Err(HubError::Transport {
                endpoint: endpoint.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(state)
    }

    /// Add (or replace) a session with `content`.
    pub fn put_session(&self, id: &str, content: &str) {
        let mut state = self.state();
        let info = session_info(id);
        state.contents.insert(info.id.clone(), content.to_string());
        if !state.sessions.iter().any(|existing| existing.id == info.id) {
            state.sessions.push(info);
        }
    }

    /// Make every request fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Raw SSE text replayed by every subscription.
    pub fn set_feed_script(&self, script: &str) {
        self.state().feed_script = script.to_string();
    }

    /// Messages accepted by `send_message`.
    pub fn sent(&self) -> Vec<String> {
        self.state().sent.clone()
    }

    /// Number of accepted emergency stops.
    pub fn stops(&self) -> usize {
        self.state().stops
    }

    /// Total requests made, including failed ones.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl HubApi for FakeHub {
    fn list_sessions(&self) -> Result<Vec<SessionInfo>, HubError> {
        Ok(self.begin("/api/sessions")?.sessions.clone())
    }

    fn session_content(&self, id: &SessionId) -> Result<String, HubError> {
        let endpoint = format!("/api/sessions/{id}");
        let state = self.begin(&endpoint)?;
        state
            .contents
            .get(id)
            .cloned()
            .ok_or_else(|| HubError::Rejected {
                endpoint,
                status: 404,
                message: "Session not found".to_string(),
            })
    }

    fn send_message(&self, message: &str) -> Result<(), HubError> {
        self.begin("/api/agent/send-message")?
            .sent
            .push(message.to_string());
        Ok(())
    }

    fn emergency_stop(&self) -> Result<(), HubError> {
        self.begin("/api/control/stop")?.stops += 1;
        Ok(())
    }

    fn health(&self) -> Result<(), HubError> {
        self.begin("/api/health").map(|_| ())
    }

    fn open_events(&self) -> Result<EventStream, HubError> {
        let script = self.begin("/api/events")?.feed_script.clone();
        Ok(Box::new(Cursor::new(script.into_bytes())))
    }
}

/// Per-test scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let dir = std::env::temp_dir().join(format!(
        "hubmon_test_{name}_{}_{}",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Runtime wired to `hub`, with its event receiver.
pub fn fake_runtime(
    hub: &Arc<FakeHub>,
    store: ConfigStore,
    export_dir: PathBuf,
) -> (Runtime, mpsc::Receiver<crate::state::AppEvent>) {
    let (sender, receiver) = mpsc::channel();
    let shared = Arc::clone(hub);
    let runtime = Runtime::new(
        &HubAddress::default(),
        Box::new(move |_: &HubAddress| Arc::clone(&shared) as Arc<dyn HubApi>),
        store,
        export_dir,
        sender,
    );
    (runtime, receiver)
}

/// Test harness for acceptance testing
///
/// Wraps TuiApp<TestBackend> to provide a clean API for simulating user
/// interactions in acceptance tests.
pub struct AcceptanceTestHarness {
    app: TuiApp<TestBackend>,
    hub: Arc<FakeHub>,
    running: bool,
}

impl AcceptanceTestHarness {
    /// Start the monitor against `hub` with the given terminal size.
    ///
    /// Runs the startup effects and waits for the first directory listing
    /// to finish.
    pub fn start(hub: Arc<FakeHub>, width: u16, height: u16) -> Result<Self, TuiError> {
        Self::start_with_store(hub, width, height, ConfigStore::new(None))
    }

    /// [`start`](Self::start) with a config store for settings tests.
    pub fn start_with_store(
        hub: Arc<FakeHub>,
        width: u16,
        height: u16,
        store: ConfigStore,
    ) -> Result<Self, TuiError> {
        let terminal = Terminal::new(TestBackend::new(width, height))?;
        let (runtime, events) = fake_runtime(&hub, store, scratch_dir("exports"));
        let app_state = AppState::new(HubAddress::default(), 20, true);

        let mut app = TuiApp::new_for_test(terminal, app_state, runtime, events);
        let running = !app.start_test();
        app.render_test()?;

        let mut harness = Self { app, hub, running };
        harness.wait_until(|state| !state.directory().is_in_flight());
        Ok(harness)
    }

    /// The fake hub behind the runtime.
    pub fn hub(&self) -> &FakeHub {
        &self.hub
    }

    /// Simulate key press without modifiers.
    ///
    /// Returns true if the key caused the app to quit.
    pub fn send_key(&mut self, key: KeyCode) -> bool {
        self.send_key_with_mods(key, KeyModifiers::NONE)
    }

    /// Simulate key press with modifiers.
    pub fn send_key_with_mods(&mut self, key: KeyCode, mods: KeyModifiers) -> bool {
        if !self.running {
            return true;
        }
        let quit = self.app.handle_key_test(KeyEvent::new(key, mods));
        if quit {
            self.running = false;
        }
        quit
    }

    /// Type text one character at a time.
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.send_key(KeyCode::Char(c));
        }
    }

    /// Apply worker results until `predicate` holds. Returns false after
    /// two seconds without success.
    pub fn wait_until(&mut self, predicate: impl Fn(&AppState) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            self.app.pump_events_test();
            if predicate(self.app.app_state()) {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            self.app
                .wait_for_event_test(remaining.min(Duration::from_millis(20)));
        }
    }

    /// Get reference to app state.
    pub fn state(&self) -> &AppState {
        self.app.app_state()
    }

    /// Check if app is still running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of live feed readers.
    pub fn open_feeds(&self) -> usize {
        self.app.open_feeds()
    }

    /// Render current state to string.
    pub fn render_to_string(&mut self) -> String {
        self.app.render_test().unwrap();
        buffer_to_string(self.app.terminal().backend().buffer())
    }
}
