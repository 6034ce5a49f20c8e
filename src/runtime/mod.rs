//! Effect execution (impure shell).
//!
//! [`Runtime`] turns the [`Effect`]s returned by
//! [`AppState`](crate::state::AppState) into hub I/O. Each request runs on a
//! short-lived worker thread that owns no state and sends exactly one
//! [`AppEvent`] back over the channel. Each feed subscription gets one
//! reader thread, stopped through its cancellation flag. The blocking socket
//! reads happen on a separate line pump, so a closed subscription stops
//! reporting within [`CANCEL_POLL`] even when the hub is silent; the pump and
//! its connection go away with the next line the hub sends.

use crate::config::ConfigStore;
use crate::feed::{FeedInput, SubscriptionId};
use crate::hub::sse::{FeedEvent, SseDecoder};
use crate::hub::{HubAddress, HubApi, HubClient};
use crate::state::{AppEvent, Effect};
use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How often a feed reader waiting on a quiet stream checks for cancellation.
pub const CANCEL_POLL: Duration = Duration::from_millis(100);

// Lines read ahead of the decoder.
const LINE_BUFFER: usize = 64;

/// Builds the hub client for an address.
pub type HubFactory = Box<dyn Fn(&HubAddress) -> Arc<dyn HubApi>>;

/// Factory producing real HTTP clients.
pub fn http_factory() -> HubFactory {
    Box::new(|address: &HubAddress| -> Arc<dyn HubApi> {
        Arc::new(HubClient::new(address.clone()))
    })
}

/// Executes effects and reports results as events.
pub struct Runtime {
    hub: Arc<dyn HubApi>,
    factory: HubFactory,
    store: ConfigStore,
    export_dir: PathBuf,
    events: Sender<AppEvent>,
    feeds: HashMap<SubscriptionId, Arc<AtomicBool>>,
}

impl Runtime {
    /// Create a runtime talking to `address`.
    pub fn new(
        address: &HubAddress,
        factory: HubFactory,
        store: ConfigStore,
        export_dir: PathBuf,
        events: Sender<AppEvent>,
    ) -> Self {
        Self {
            hub: factory(address),
            factory,
            store,
            export_dir,
            events,
            feeds: HashMap::new(),
        }
    }

    /// Number of feed readers not yet told to stop.
    pub fn open_feeds(&self) -> usize {
        self.feeds.len()
    }

    /// Execute effects in order. Returns `true` once [`Effect::Quit`] is seen.
    pub fn execute_all(&mut self, effects: Vec<Effect>) -> bool {
        let mut quit = false;
        for effect in effects {
            quit |= self.execute(effect);
        }
        quit
    }

    /// Execute one effect. Returns `true` for [`Effect::Quit`].
    pub fn execute(&mut self, effect: Effect) -> bool {
        debug!(?effect, "Executing effect");
        match effect {
            Effect::FetchSession(ticket) => self.spawn_request(move |hub| {
                let result = hub.session_content(ticket.session());
                AppEvent::SessionFetched { ticket, result }
            }),
            Effect::ListSessions => {
                self.spawn_request(|hub| AppEvent::SessionsListed(hub.list_sessions()))
            }
            Effect::OpenFeed(id) => self.open_feed(id),
            Effect::CloseFeed(id) => self.close_feed(id),
            Effect::SendMessage(message) => {
                self.spawn_request(move |hub| AppEvent::MessageSent(hub.send_message(&message)))
            }
            Effect::EmergencyStop => {
                self.spawn_request(|hub| AppEvent::StopCompleted(hub.emergency_stop()))
            }
            Effect::CheckHealth => self.spawn_request(|hub| AppEvent::HealthChecked(hub.health())),
            Effect::Export(session) => {
                let dir = self.export_dir.clone();
                self.spawn_request(move |hub| {
                    let now = chrono::Utc::now();
                    AppEvent::ExportFinished(crate::export::export_session(
                        hub, &dir, &session, now,
                    ))
                })
            }
            Effect::SaveSettings(address) => self.save_settings(address),
            Effect::Quit => {
                self.shutdown();
                return true;
            }
        }
        false
    }

    /// Stop every feed reader.
    pub fn shutdown(&mut self) {
        for (id, cancel) in self.feeds.drain() {
            debug!(subscription = %id, "Cancelling feed reader");
            cancel.store(true, Ordering::SeqCst);
        }
    }

    fn spawn_request<F>(&self, job: F)
    where
        F: FnOnce(&dyn HubApi) -> AppEvent + Send + 'static,
    {
        let hub = Arc::clone(&self.hub);
        let events = self.events.clone();
        thread::spawn(move || {
            let event = job(hub.as_ref());
            if events.send(event).is_err() {
                debug!("Event loop gone; dropping request result");
            }
        });
    }

    fn save_settings(&mut self, address: HubAddress) {
        let result = self.store.save_hub_address(&address).map(|path| {
            info!(path = %path.display(), hub = %address, "Switching hub client");
            self.hub = (self.factory)(&address);
            address
        });
        if self.events.send(AppEvent::SettingsSaved(result)).is_err() {
            debug!("Event loop gone; dropping settings result");
        }
    }

    fn open_feed(&mut self, id: SubscriptionId) {
        let cancel = Arc::new(AtomicBool::new(false));
        self.feeds.insert(id, Arc::clone(&cancel));

        let hub = Arc::clone(&self.hub);
        let events = self.events.clone();
        thread::spawn(move || {
            let stream = match hub.open_events() {
                Ok(stream) => stream,
                Err(error) => {
                    let _ = events.send(AppEvent::Feed(FeedInput::Failed {
                        subscription: id,
                        reason: error.to_string(),
                    }));
                    return;
                }
            };
            if events.send(AppEvent::Feed(FeedInput::Opened(id))).is_err() {
                return;
            }

            let reason = match read_feed(stream, id, &cancel, &events) {
                Ok(()) => return,
                Err(reason) => reason,
            };
            if !cancel.load(Ordering::SeqCst) {
                let _ = events.send(AppEvent::Feed(FeedInput::Failed {
                    subscription: id,
                    reason,
                }));
            }
        });
    }

    fn close_feed(&mut self, id: SubscriptionId) {
        if let Some(cancel) = self.feeds.remove(&id) {
            debug!(subscription = %id, "Closing feed");
            cancel.store(true, Ordering::SeqCst);
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Decode an SSE stream into feed events until it ends.
///
/// Returns `Ok(())` when stopped through `cancel` or when the receiving side
/// is gone, and `Err` with a reason when the stream fails or closes.
/// Undecodable events are logged and skipped. `cancel` is honoured within
/// [`CANCEL_POLL`] even while no data arrives.
pub fn read_feed(
    stream: impl BufRead + Send + 'static,
    subscription: SubscriptionId,
    cancel: &AtomicBool,
    events: &Sender<AppEvent>,
) -> Result<(), String> {
    let lines = pump_lines(stream);
    let mut decoder = SseDecoder::new();

    loop {
        if cancel.load(Ordering::SeqCst) {
            return Ok(());
        }
        let line = match lines.recv_timeout(CANCEL_POLL) {
            Ok(line) => line.map_err(|error| error.to_string())?,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let Some(frame) = decoder.push_line(&line) else {
            continue;
        };
        match FeedEvent::from_frame(&frame) {
            Ok(Some(event)) => {
                let input = FeedInput::Event {
                    subscription,
                    event,
                };
                if events.send(AppEvent::Feed(input)).is_err() {
                    return Ok(());
                }
            }
            Ok(None) => debug!(event = %frame.event, "Ignoring unknown feed event"),
            Err(error) => warn!(%error, "Skipping undecodable feed event"),
        }
    }

    if cancel.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err("event stream closed".to_string())
    }
}

// Reads lines on their own thread. The thread stops after the first read
// error, at end of stream, or once the receiver is dropped.
fn pump_lines(stream: impl BufRead + Send + 'static) -> Receiver<io::Result<String>> {
    let (sender, receiver) = mpsc::sync_channel(LINE_BUFFER);
    thread::spawn(move || {
        for line in stream.lines() {
            let failed = line.is_err();
            if sender.send(line).is_err() || failed {
                return;
            }
        }
    });
    receiver
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
