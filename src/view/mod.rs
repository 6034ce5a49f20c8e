//! TUI rendering and terminal management (impure shell)

pub mod chat;
pub mod composer;
pub mod constants;
pub mod dialogs;
mod help;
pub mod layout;
pub mod sidebar;
pub mod status;
mod styles;
pub mod toasts;

pub use help::render_help_overlay;
pub use layout::{render_layout, ScreenLayout};
pub use status::ConnectionIndicator;

use crate::config::{ConfigStore, ResolvedConfig};
use crate::model::AppError;
use crate::runtime::{http_factory, Runtime};
use crate::state::{AppEvent, AppState};
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Longest the loop sleeps before checking the result channel again.
const MAX_POLL_WAIT: Duration = Duration::from_millis(50);

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Application error
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

/// What one pass over the result channel and timers produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Idle,
    Changed,
    Quit,
}

impl Step {
    fn merge(self, other: Step) -> Step {
        match (self, other) {
            (Step::Quit, _) | (_, Step::Quit) => Step::Quit,
            (Step::Changed, _) | (_, Step::Changed) => Step::Changed,
            _ => Step::Idle,
        }
    }
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    app_state: AppState,
    runtime: Runtime,
    events: Receiver<AppEvent>,
    started: Instant,
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    fn from_parts(
        terminal: Terminal<B>,
        app_state: AppState,
        runtime: Runtime,
        events: Receiver<AppEvent>,
    ) -> Self {
        Self {
            terminal,
            app_state,
            runtime,
            events,
            started: Instant::now(),
        }
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits (q or Ctrl+C). Sleeps until a key, a
    /// worker result or the next scheduled task, whichever comes first.
    pub fn run(&mut self) -> Result<(), TuiError> {
        let effects = self.app_state.start(self.now());
        if self.runtime.execute_all(effects) {
            return Ok(());
        }
        self.draw()?;

        loop {
            let mut step = Step::Idle;

            if event::poll(self.poll_timeout())? {
                match event::read()? {
                    // Release/repeat events would double every keystroke on Windows.
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        step = self.dispatch(AppEvent::Key(key));
                    }
                    Event::Resize(width, height) => {
                        debug!(width, height, "Terminal resized");
                        step = Step::Changed;
                    }
                    _ => {}
                }
            }

            step = step.merge(self.pump_events());
            step = step.merge(self.run_due_tasks());

            match step {
                Step::Quit => {
                    info!("Quitting");
                    return Ok(());
                }
                Step::Changed => self.draw()?,
                Step::Idle => {}
            }
        }
    }

    fn poll_timeout(&self) -> Duration {
        let now = self.now();
        self.app_state
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(now))
            .unwrap_or(MAX_POLL_WAIT)
            .min(MAX_POLL_WAIT)
    }

    fn dispatch(&mut self, event: AppEvent) -> Step {
        let effects = self.app_state.handle(event, self.now());
        if self.runtime.execute_all(effects) {
            Step::Quit
        } else {
            Step::Changed
        }
    }

    /// Feed every queued worker result into the state.
    fn pump_events(&mut self) -> Step {
        let mut step = Step::Idle;
        loop {
            match self.events.try_recv() {
                Ok(event) => step = step.merge(self.dispatch(event)),
                Err(TryRecvError::Empty) => return step,
                // Runtime holds a sender for as long as the app lives.
                Err(TryRecvError::Disconnected) => return step,
            }
        }
    }

    fn run_due_tasks(&mut self) -> Step {
        let now = self.now();
        if !self
            .app_state
            .next_deadline()
            .is_some_and(|deadline| deadline <= now)
        {
            return Step::Idle;
        }
        let effects = self.app_state.tick(now);
        if self.runtime.execute_all(effects) {
            Step::Quit
        } else {
            Step::Changed
        }
    }

    /// Render the current frame
    ///
    /// Applies the chat viewport for the current terminal size first, so
    /// scroll and clipping use the dimensions actually drawn.
    fn draw(&mut self) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        let screen = ScreenLayout::new(Rect::new(0, 0, size.width.max(1), size.height));
        self.app_state.set_chat_viewport(screen.chat_viewport());

        self.terminal.draw(|frame| {
            layout::render_layout(frame, &self.app_state);
        })?;
        Ok(())
    }
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(config: &ResolvedConfig, config_path: Option<PathBuf>) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let (sender, receiver) = mpsc::channel();
        let address = config.hub_address();
        let runtime = Runtime::new(
            &address,
            http_factory(),
            ConfigStore::new(config_path),
            config.export_dir.clone(),
            sender,
        );
        let app_state = AppState::new(address, config.max_lines, config.auto_scroll);

        Ok(Self::from_parts(terminal, app_state, runtime, receiver))
    }
}

// ===== Test Helpers =====
//
// The following methods are ONLY for testing within the crate.

#[cfg(test)]
#[allow(dead_code)] // Not every helper is used by every test module
impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Create TuiApp for testing without terminal initialization.
    pub(crate) fn new_for_test(
        terminal: Terminal<B>,
        app_state: AppState,
        runtime: Runtime,
        events: Receiver<AppEvent>,
    ) -> Self {
        Self::from_parts(terminal, app_state, runtime, events)
    }

    /// Run the startup effects (directory fetch, feed subscription).
    pub(crate) fn start_test(&mut self) -> bool {
        let effects = self.app_state.start(self.now());
        self.runtime.execute_all(effects)
    }

    /// Get reference to app state (test-only accessor)
    pub(crate) fn app_state(&self) -> &AppState {
        &self.app_state
    }

    /// Handle a single keyboard event. Returns true if app should quit.
    pub(crate) fn handle_key_test(&mut self, key: crossterm::event::KeyEvent) -> bool {
        self.dispatch(AppEvent::Key(key)) == Step::Quit
    }

    /// Block for one worker result (up to `timeout`) and apply it.
    ///
    /// Returns false when nothing arrived in time.
    pub(crate) fn wait_for_event_test(&mut self, timeout: Duration) -> bool {
        match self.events.recv_timeout(timeout) {
            Ok(event) => {
                self.dispatch(event);
                true
            }
            Err(_) => false,
        }
    }

    /// Apply every queued worker result without blocking.
    pub(crate) fn pump_events_test(&mut self) {
        self.pump_events();
    }

    /// Render the current state (test-only accessor)
    pub(crate) fn render_test(&mut self) -> Result<(), TuiError> {
        self.draw()
    }

    /// Get reference to terminal (test-only accessor)
    pub(crate) fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Number of live feed readers in the runtime.
    pub(crate) fn open_feeds(&self) -> usize {
        self.runtime.open_feeds()
    }
}

/// Initialize and run the TUI application
///
/// This is the main entry point for the TUI. It handles terminal
/// setup, runs the event loop, and ensures cleanup on exit.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run_tui(config: &ResolvedConfig, config_path: Option<PathBuf>) -> Result<(), TuiError> {
    let mut app = TuiApp::new(config, config_path)?;

    // Run the app and ensure cleanup happens even on error
    let result = app.run();
    drop(app);

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
///
/// Disables raw mode and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tui_error_from_io_error() {
        let io_err = io::Error::other("test error");
        let tui_err: TuiError = io_err.into();
        assert!(matches!(tui_err, TuiError::Io(_)));
    }

    #[test]
    fn quit_dominates_merged_steps() {
        assert_eq!(Step::Changed.merge(Step::Quit), Step::Quit);
        assert_eq!(Step::Idle.merge(Step::Changed), Step::Changed);
        assert_eq!(Step::Idle.merge(Step::Idle), Step::Idle);
    }
}
