//! Live feed connection lifecycle.
//!
//! [`FeedController`] is a pure state machine over the hub's SSE
//! subscription. It decides when to open and close subscriptions and when to
//! arm the reconnect timer; the runtime performs the actual I/O and reports
//! back through [`FeedInput`]s.
//!
//! ```text
//!                connect()            Opened
//! Disconnected ───────────▶ Connecting ──────▶ Connected
//!      ▲                        │                  │
//!      └────────── Failed ──────┴──────────────────┘
//!            (arms Reconnect after 5 s unless pending)
//! ```

use crate::hub::sse::FeedEvent;
use crate::model::SessionId;
use crate::scheduler::{Scheduler, Task};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Delay before re-opening a dropped feed.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Identity of one subscription attempt.
///
/// Increases monotonically so inputs from a closed subscription can be told
/// apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a raw id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Feed connection status shown in the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No subscription open.
    #[default]
    Disconnected,
    /// Subscription requested, not yet open.
    Connecting,
    /// Subscription open.
    Connected,
}

impl ConnectionState {
    /// Status label.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Connected => "Connected",
        }
    }
}

/// Report from the runtime about a subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedInput {
    /// The stream opened.
    Opened(SubscriptionId),
    /// The stream could not be opened, or dropped.
    Failed {
        /// Subscription that failed.
        subscription: SubscriptionId,
        /// Failure description.
        reason: String,
    },
    /// A decoded event arrived.
    Event {
        /// Subscription that delivered it.
        subscription: SubscriptionId,
        /// The event.
        event: FeedEvent,
    },
}

/// Work requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    /// Open a subscription under this id.
    Open(SubscriptionId),
    /// Close the subscription with this id.
    Close(SubscriptionId),
    /// The hub reported a session change, naming the session when it could.
    SessionChanged(Option<SessionId>),
}

/// SSE subscription state machine.
#[derive(Debug, Default)]
pub struct FeedController {
    state: ConnectionState,
    current: Option<SubscriptionId>,
    next_id: u64,
    shut_down: bool,
}

impl FeedController {
    /// Create a disconnected controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The live subscription, if any.
    pub fn current(&self) -> Option<SubscriptionId> {
        self.current
    }

    /// Whether [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Drop any subscription and open a fresh one.
    pub fn connect(&mut self, scheduler: &mut Scheduler) -> Vec<FeedCommand> {
        if self.shut_down {
            return Vec::new();
        }

        scheduler.cancel(Task::Reconnect);

        let mut commands = Vec::new();
        if let Some(old) = self.current.take() {
            commands.push(FeedCommand::Close(old));
        }

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.current = Some(id);
        self.state = ConnectionState::Connecting;
        info!(subscription = %id, "Connecting to live feed");

        commands.push(FeedCommand::Open(id));
        commands
    }

    /// Apply a runtime report.
    pub fn handle(
        &mut self,
        input: FeedInput,
        scheduler: &mut Scheduler,
        now: Duration,
    ) -> Vec<FeedCommand> {
        if self.shut_down {
            return Vec::new();
        }

        match input {
            FeedInput::Opened(id) => {
                if self.current != Some(id) {
                    debug!(subscription = %id, "Ignoring open of superseded subscription");
                    return Vec::new();
                }
                self.state = ConnectionState::Connected;
                info!(subscription = %id, "Live feed connected");
                Vec::new()
            }
            FeedInput::Failed {
                subscription,
                reason,
            } => {
                if self.current != Some(subscription) {
                    debug!(%subscription, "Ignoring failure of superseded subscription");
                    return Vec::new();
                }
                self.current = None;
                self.state = ConnectionState::Disconnected;
                warn!(%subscription, %reason, "Live feed lost");

                if scheduler.schedule_if_idle(Task::Reconnect, RECONNECT_DELAY, now) {
                    info!(delay_ms = RECONNECT_DELAY.as_millis() as u64, "Reconnect scheduled");
                }
                vec![FeedCommand::Close(subscription)]
            }
            FeedInput::Event {
                subscription,
                event,
            } => {
                if self.current != Some(subscription) {
                    return Vec::new();
                }
                self.handle_event(event)
            }
        }
    }

    fn handle_event(&mut self, event: FeedEvent) -> Vec<FeedCommand> {
        match event {
            FeedEvent::Session { id } => {
                debug!(session = ?id, "Session change notification");
                vec![FeedCommand::SessionChanged(id)]
            }
            FeedEvent::Initial(payload) => {
                debug!(%payload, "Initial feed snapshot");
                Vec::new()
            }
            FeedEvent::Log(payload) => {
                debug!(%payload, "Hub log");
                Vec::new()
            }
            FeedEvent::Heartbeat => {
                trace!("Heartbeat");
                Vec::new()
            }
        }
    }

    /// The reconnect timer fired.
    ///
    /// The scheduler has already removed the task, so the pending marker is
    /// clear before the new attempt starts.
    pub fn reconnect_due(&mut self, scheduler: &mut Scheduler) -> Vec<FeedCommand> {
        self.connect(scheduler)
    }

    /// Close the subscription and cancel any pending reconnect.
    ///
    /// All later inputs are ignored.
    pub fn shutdown(&mut self, scheduler: &mut Scheduler) -> Vec<FeedCommand> {
        scheduler.cancel(Task::Reconnect);
        self.shut_down = true;
        self.state = ConnectionState::Disconnected;
        self.current
            .take()
            .map(FeedCommand::Close)
            .into_iter()
            .collect()
    }
}
