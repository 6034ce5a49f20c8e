//! Application state and transitions.
//!
//! AppState is the root state type. Every input (key press, hub response,
//! feed report) goes through [`AppState::handle`], and elapsed timers go
//! through [`AppState::tick`]. Both mutate state and return the [`Effect`]s
//! the runtime must carry out. Nothing in here touches the network, the
//! clock or the terminal, so every transition is testable in isolation.
//!
//! # Data flow
//!
//! ```text
//! feed `session` event ─▶ FetchCache::refresh ─▶ Effect::FetchSession
//!                                                      │ (runtime)
//! AppEvent::SessionFetched ◀───────────────────────────┘
//!        └─▶ FetchCache::complete ─▶ RenderEngine::render
//! ```

use crate::config::{ConfigError, KeyBindings};
use crate::directory::{DirectoryOutcome, SessionDirectory, POLL_INTERVAL};
use crate::feed::{ConnectionState, FeedCommand, FeedController, FeedInput, SubscriptionId};
use crate::hub::HubAddress;
use crate::model::{AppError, HubError, KeyAction, SessionId, SessionInfo};
use crate::render::{RenderMode, Viewport, MAX_MAX_LINES, MIN_MAX_LINES};
use crate::scheduler::{Scheduler, Task};
use crate::session::{FetchCache, FetchOutcome, FetchTicket, SessionView};
use crate::state::input::TextInput;
use crate::state::modal::{Mode, SettingsForm};
use crate::state::notifications::{Notifications, ToastLevel, TOAST_LIFETIME};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay between a successful send and the full reload of the session.
pub const RELOAD_AFTER_SEND: Duration = Duration::from_millis(1000);

/// Amount the line limit changes per key press.
pub const MAX_LINES_STEP: usize = 5;

// ===== Events and effects =====

/// Input to the state machine.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press from the terminal.
    Key(KeyEvent),
    /// A session content fetch finished.
    SessionFetched {
        /// The ticket the fetch was issued under.
        ticket: FetchTicket,
        /// Raw content or the failure.
        result: Result<String, HubError>,
    },
    /// A session listing finished.
    SessionsListed(Result<Vec<SessionInfo>, HubError>),
    /// Report from a feed subscription.
    Feed(FeedInput),
    /// A composed message was delivered or rejected.
    MessageSent(Result<(), HubError>),
    /// The emergency stop request finished.
    StopCompleted(Result<(), HubError>),
    /// The connection test finished.
    HealthChecked(Result<(), HubError>),
    /// An HTML export finished.
    ExportFinished(Result<PathBuf, AppError>),
    /// The hub address was persisted and the client swapped.
    SettingsSaved(Result<HubAddress, ConfigError>),
}

/// Work for the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch session content; answer with [`AppEvent::SessionFetched`].
    FetchSession(FetchTicket),
    /// Fetch the session list; answer with [`AppEvent::SessionsListed`].
    ListSessions,
    /// Open a feed subscription under this id.
    OpenFeed(SubscriptionId),
    /// Stop the reader of this subscription.
    CloseFeed(SubscriptionId),
    /// Post a message to the agent.
    SendMessage(String),
    /// Trigger the emergency stop.
    EmergencyStop,
    /// Probe the hub's health endpoint.
    CheckHealth,
    /// Export a session to HTML.
    Export(SessionId),
    /// Persist the address and switch the hub client to it.
    SaveSettings(HubAddress),
    /// Leave the event loop.
    Quit,
}

// ===== FocusPane =====

/// Pane receiving navigation keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusPane {
    /// Session list.
    #[default]
    Sidebar,
    /// Message bubbles of the active session.
    Chat,
}

// ===== AppState =====

/// Root application state.
#[derive(Debug)]
pub struct AppState {
    /// Pane with keyboard focus in normal mode.
    pub focus: FocusPane,
    mode: Mode,
    composer: TextInput,
    cache: FetchCache,
    directory: SessionDirectory,
    feed: FeedController,
    scheduler: Scheduler,
    notifications: Notifications,
    key_bindings: KeyBindings,
    hub_address: HubAddress,
    chat_viewport: Viewport,
    quitting: bool,
}

impl AppState {
    /// Create the state for a hub at `hub_address`.
    pub fn new(hub_address: HubAddress, max_lines: usize, auto_scroll: bool) -> Self {
        let max_lines = max_lines.clamp(MIN_MAX_LINES, MAX_MAX_LINES);
        Self {
            focus: FocusPane::Sidebar,
            mode: Mode::Normal,
            composer: TextInput::default(),
            cache: FetchCache::new(max_lines, auto_scroll),
            directory: SessionDirectory::new(),
            feed: FeedController::new(),
            scheduler: Scheduler::new(),
            notifications: Notifications::default(),
            key_bindings: KeyBindings::default(),
            hub_address,
            chat_viewport: Viewport::default(),
            quitting: false,
        }
    }

    /// Effects that bring the app up: open the feed, list sessions, start polling.
    pub fn start(&mut self, now: Duration) -> Vec<Effect> {
        info!(hub = %self.hub_address, "Starting monitor");
        let commands = self.feed.connect(&mut self.scheduler);
        let mut effects = self.apply_feed_commands(commands);
        effects.extend(self.refresh_directory());
        self.scheduler.schedule(Task::DirectoryPoll, POLL_INTERVAL, now);
        effects
    }

    // ===== Accessors =====

    /// Current modal mode.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Composer contents.
    pub fn composer(&self) -> &TextInput {
        &self.composer
    }

    /// Active session view, if a session is selected.
    pub fn active_view(&self) -> Option<&SessionView> {
        self.cache.view()
    }

    /// Id of the active session.
    pub fn active_session(&self) -> Option<&SessionId> {
        self.cache.active_id()
    }

    /// Session fetch cache.
    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    /// Session list and sidebar cursor.
    pub fn directory(&self) -> &SessionDirectory {
        &self.directory
    }

    /// Feed connection state for the status indicator.
    pub fn connection_state(&self) -> ConnectionState {
        self.feed.state()
    }

    /// Toasts on screen.
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Hub the app talks to.
    pub fn hub_address(&self) -> &HubAddress {
        &self.hub_address
    }

    /// Pending timers.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Earliest pending timer deadline, for the event loop's poll timeout.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Whether a quit has been requested.
    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Size of the chat pane's content area.
    pub fn chat_viewport(&self) -> Viewport {
        self.chat_viewport
    }

    /// Record the chat pane size from the latest layout.
    pub fn set_chat_viewport(&mut self, viewport: Viewport) {
        self.chat_viewport = viewport;
        if let Some(view) = self.cache.view_mut() {
            view.engine_mut().set_viewport(viewport);
        }
    }

    // ===== Dispatch =====

    /// Apply one event.
    pub fn handle(&mut self, event: AppEvent, now: Duration) -> Vec<Effect> {
        match event {
            AppEvent::Key(key) => self.handle_key(key, now),
            AppEvent::SessionFetched { ticket, result } => {
                self.on_session_fetched(&ticket, result, now)
            }
            AppEvent::SessionsListed(result) => self.on_sessions_listed(result, now),
            AppEvent::Feed(input) => {
                let commands = self.feed.handle(input, &mut self.scheduler, now);
                self.apply_feed_commands(commands)
            }
            AppEvent::MessageSent(result) => self.on_message_sent(result, now),
            AppEvent::StopCompleted(result) => {
                match result {
                    Ok(()) => self.notify(ToastLevel::Danger, "Emergency Stop Triggered", now),
                    Err(error) => self.notify(
                        ToastLevel::Danger,
                        format!("Failed to stop bot: {}", error.detail()),
                        now,
                    ),
                }
                Vec::new()
            }
            AppEvent::HealthChecked(result) => {
                match result {
                    Ok(()) => self.notify(ToastLevel::Success, "Successfully connected to hub", now),
                    Err(error) => self.notify(
                        ToastLevel::Danger,
                        format!("Connection failed: {}", error.detail()),
                        now,
                    ),
                }
                Vec::new()
            }
            AppEvent::ExportFinished(result) => {
                match result {
                    Ok(path) => {
                        info!(path = %path.display(), "Session exported");
                        self.notify(ToastLevel::Success, "Session exported successfully", now);
                    }
                    Err(error) => {
                        warn!(%error, "Export failed");
                        self.notify(ToastLevel::Danger, "Failed to export session", now);
                    }
                }
                Vec::new()
            }
            AppEvent::SettingsSaved(result) => self.on_settings_saved(result, now),
        }
    }

    /// Run every timer that is due at `now`.
    pub fn tick(&mut self, now: Duration) -> Vec<Effect> {
        let mut effects = Vec::new();
        for task in self.scheduler.due(now) {
            match task {
                Task::Reconnect => {
                    let commands = self.feed.reconnect_due(&mut self.scheduler);
                    effects.extend(self.apply_feed_commands(commands));
                }
                Task::DirectoryPoll => {
                    self.scheduler.schedule(Task::DirectoryPoll, POLL_INTERVAL, now);
                    effects.extend(self.refresh_directory());
                }
                Task::ReloadAfterSend => {
                    effects.extend(self.cache.refresh_active(RenderMode::Full).map(Effect::FetchSession));
                }
                Task::DismissToast(id) => {
                    self.notifications.dismiss(id);
                }
            }
        }
        effects
    }

    fn notify(&mut self, level: ToastLevel, message: impl Into<String>, now: Duration) {
        let id = self.notifications.push(level, message);
        self.scheduler.schedule(Task::DismissToast(id), TOAST_LIFETIME, now);
    }

    fn refresh_directory(&mut self) -> Option<Effect> {
        self.directory.request_refresh().then_some(Effect::ListSessions)
    }

    fn apply_feed_commands(&mut self, commands: Vec<FeedCommand>) -> Vec<Effect> {
        let mut effects = Vec::new();
        for command in commands {
            match command {
                FeedCommand::Open(id) => effects.push(Effect::OpenFeed(id)),
                FeedCommand::Close(id) => effects.push(Effect::CloseFeed(id)),
                FeedCommand::SessionChanged(id) => {
                    if let Some(id) = id.filter(|id| self.cache.active_id() == Some(id)) {
                        effects.extend(
                            self.cache
                                .refresh(&id, RenderMode::Incremental)
                                .map(Effect::FetchSession),
                        );
                    }
                    effects.extend(self.refresh_directory());
                }
            }
        }
        effects
    }

    // ===== Hub responses =====

    fn on_session_fetched(
        &mut self,
        ticket: &FetchTicket,
        result: Result<String, HubError>,
        now: Duration,
    ) -> Vec<Effect> {
        match self.cache.complete(ticket, result) {
            FetchOutcome::Rendered(outcome) => {
                debug!(session = %ticket.session(), ?outcome, "Session rendered");
                Vec::new()
            }
            FetchOutcome::Unchanged => Vec::new(),
            FetchOutcome::Stale { follow_up } => {
                follow_up.map(Effect::FetchSession).into_iter().collect()
            }
            FetchOutcome::Failed(error) => {
                warn!(session = %ticket.session(), %error, "Session fetch failed");
                self.notify(ToastLevel::Danger, "Failed to load session", now);
                Vec::new()
            }
        }
    }

    fn on_sessions_listed(
        &mut self,
        result: Result<Vec<SessionInfo>, HubError>,
        now: Duration,
    ) -> Vec<Effect> {
        if let DirectoryOutcome::Failed(error) = self.directory.complete(result) {
            warn!(%error, "Session listing failed");
            self.notify(ToastLevel::Danger, "Failed to load sessions", now);
        }

        if self.directory.take_queued() {
            vec![Effect::ListSessions]
        } else {
            Vec::new()
        }
    }

    fn on_message_sent(&mut self, result: Result<(), HubError>, now: Duration) -> Vec<Effect> {
        match result {
            Ok(()) => {
                self.composer.clear();
                self.notify(ToastLevel::Success, "Message sent successfully", now);
                self.scheduler.schedule(Task::ReloadAfterSend, RELOAD_AFTER_SEND, now);
            }
            Err(error) => {
                self.notify(
                    ToastLevel::Danger,
                    format!("Failed to send message: {}", error.detail()),
                    now,
                );
            }
        }
        Vec::new()
    }

    fn on_settings_saved(
        &mut self,
        result: Result<HubAddress, ConfigError>,
        now: Duration,
    ) -> Vec<Effect> {
        match result {
            Ok(address) => {
                self.hub_address = address;
                self.notify(ToastLevel::Success, "Configuration saved successfully", now);
                let commands = self.feed.connect(&mut self.scheduler);
                let mut effects = self.apply_feed_commands(commands);
                effects.extend(self.refresh_directory());
                effects
            }
            Err(error) => {
                self.notify(
                    ToastLevel::Danger,
                    format!("Failed to save configuration: {error}"),
                    now,
                );
                Vec::new()
            }
        }
    }

    // ===== Keys =====

    fn handle_key(&mut self, key: KeyEvent, now: Duration) -> Vec<Effect> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.quit();
        }

        match &self.mode {
            Mode::Normal => match self.key_bindings.get(key) {
                Some(action) => self.handle_action(action, now),
                None => Vec::new(),
            },
            Mode::Composing => self.handle_composer_key(key, now),
            Mode::Settings(_) => self.handle_settings_key(key),
            Mode::ConfirmStop => self.handle_confirm_key(key),
            Mode::Help => {
                self.mode = Mode::Normal;
                Vec::new()
            }
        }
    }

    /// Apply a bound action in normal mode.
    pub fn handle_action(&mut self, action: KeyAction, now: Duration) -> Vec<Effect> {
        match action {
            KeyAction::ScrollUp => match self.focus {
                FocusPane::Sidebar => self.directory.select_prev(),
                FocusPane::Chat => self.with_engine(|engine| engine.scroll_up(1)),
            },
            KeyAction::ScrollDown => match self.focus {
                FocusPane::Sidebar => self.directory.select_next(),
                FocusPane::Chat => self.with_engine(|engine| engine.scroll_down(1)),
            },
            KeyAction::PageUp => self.with_engine(|engine| engine.page_up()),
            KeyAction::PageDown => self.with_engine(|engine| engine.page_down()),
            KeyAction::ScrollToTop => match self.focus {
                FocusPane::Sidebar => self.directory.select_first(),
                FocusPane::Chat => self.with_engine(|engine| engine.scroll_to_top()),
            },
            KeyAction::ScrollToBottom => match self.focus {
                FocusPane::Sidebar => self.directory.select_last(),
                FocusPane::Chat => self.with_engine(|engine| engine.scroll_to_bottom()),
            },
            KeyAction::CycleFocus => {
                self.focus = match self.focus {
                    FocusPane::Sidebar => FocusPane::Chat,
                    FocusPane::Chat => FocusPane::Sidebar,
                };
            }
            KeyAction::Activate => match self.focus {
                FocusPane::Sidebar => return self.open_selected_session(),
                FocusPane::Chat => self.with_engine(|engine| {
                    engine.toggle_focused();
                }),
            },
            KeyAction::NextEntry => self.with_engine(|engine| engine.focus_next()),
            KeyAction::PrevEntry => self.with_engine(|engine| engine.focus_prev()),
            KeyAction::ToggleExpand => self.with_engine(|engine| {
                engine.toggle_focused();
            }),
            KeyAction::IncreaseMaxLines => {
                let max_lines = self.cache.max_lines().saturating_add(MAX_LINES_STEP);
                self.set_max_lines(max_lines, now);
            }
            KeyAction::DecreaseMaxLines => {
                let max_lines = self.cache.max_lines().saturating_sub(MAX_LINES_STEP);
                self.set_max_lines(max_lines, now);
            }
            KeyAction::ToggleAutoScroll => {
                let enabled = !self.cache.auto_scroll();
                self.cache.set_auto_scroll(enabled);
                let label = if enabled { "on" } else { "off" };
                self.notify(ToastLevel::Info, format!("Auto-scroll {label}"), now);
            }
            KeyAction::Compose => self.mode = Mode::Composing,
            KeyAction::EmergencyStop => self.mode = Mode::ConfirmStop,
            KeyAction::Export => {
                return match self.cache.active_id() {
                    Some(id) => vec![Effect::Export(id.clone())],
                    None => {
                        self.notify(ToastLevel::Warning, "No session selected", now);
                        Vec::new()
                    }
                };
            }
            KeyAction::TestConnection => return vec![Effect::CheckHealth],
            KeyAction::OpenSettings => {
                self.mode = Mode::Settings(SettingsForm::from_address(&self.hub_address));
            }
            KeyAction::RefreshSessions => return self.refresh_directory().into_iter().collect(),
            KeyAction::Reconnect => {
                let commands = self.feed.connect(&mut self.scheduler);
                return self.apply_feed_commands(commands);
            }
            KeyAction::Quit => return self.quit(),
            KeyAction::Help => self.mode = Mode::Help,
        }
        Vec::new()
    }

    fn with_engine(&mut self, update: impl FnOnce(&mut crate::render::RenderEngine)) {
        if let Some(view) = self.cache.view_mut() {
            update(view.engine_mut());
        }
    }

    fn set_max_lines(&mut self, max_lines: usize, now: Duration) {
        let max_lines = max_lines.clamp(MIN_MAX_LINES, MAX_MAX_LINES);
        if max_lines == self.cache.max_lines() {
            return;
        }
        self.cache.set_max_lines(max_lines);
        self.notify(ToastLevel::Info, format!("Max lines: {max_lines}"), now);
    }

    fn open_selected_session(&mut self) -> Vec<Effect> {
        let Some(id) = self.directory.selected().map(|info| info.id.clone()) else {
            return Vec::new();
        };
        info!(session = %id, "Opening session");
        self.focus = FocusPane::Chat;
        let ticket = self.cache.select(id);
        if let Some(view) = self.cache.view_mut() {
            view.engine_mut().set_viewport(self.chat_viewport);
        }
        ticket.map(Effect::FetchSession).into_iter().collect()
    }

    fn quit(&mut self) -> Vec<Effect> {
        self.quitting = true;
        let commands = self.feed.shutdown(&mut self.scheduler);
        let mut effects = self.apply_feed_commands(commands);
        effects.push(Effect::Quit);
        effects
    }

    fn handle_composer_key(&mut self, key: KeyEvent, now: Duration) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => return self.submit_message(now),
            KeyCode::Backspace => self.composer.backspace(),
            KeyCode::Delete => self.composer.delete(),
            KeyCode::Left => self.composer.left(),
            KeyCode::Right => self.composer.right(),
            KeyCode::Home => self.composer.home(),
            KeyCode::End => self.composer.end(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.composer.insert(ch)
            }
            _ => {}
        }
        Vec::new()
    }

    fn submit_message(&mut self, now: Duration) -> Vec<Effect> {
        let message = self.composer.value().trim().to_string();
        if message.is_empty() {
            self.notify(ToastLevel::Warning, "Please enter a message", now);
            return Vec::new();
        }
        if self.cache.active_id().is_none() {
            self.notify(ToastLevel::Warning, "No active session selected", now);
            return Vec::new();
        }

        self.mode = Mode::Normal;
        vec![Effect::SendMessage(message)]
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Mode::Settings(form) = &mut self.mode else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                let address = form.address();
                self.mode = Mode::Normal;
                return vec![Effect::SaveSettings(address)];
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.switch_field(),
            KeyCode::Backspace => form.focused_input().backspace(),
            KeyCode::Delete => form.focused_input().delete(),
            KeyCode::Left => form.focused_input().left(),
            KeyCode::Right => form.focused_input().right(),
            KeyCode::Home => form.focused_input().home(),
            KeyCode::End => form.focused_input().end(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.focused_input().insert(ch)
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.mode = Mode::Normal;
                warn!("Emergency stop confirmed");
                vec![Effect::EmergencyStop]
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.mode = Mode::Normal;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "app_state_tests.rs"]
mod tests;
