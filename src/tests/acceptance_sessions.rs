//! Acceptance tests: browsing the session directory and reading transcripts.

use crate::render::EMPTY_PLACEHOLDER;
use crate::state::{AppState, FocusPane, ToastLevel};
use crate::test_harness::{session_log, AcceptanceTestHarness, FakeHub};
use crate::view::sidebar::NO_SESSIONS;
use crossterm::event::{KeyCode, KeyModifiers};

fn has_toast(state: &AppState, text: &str) -> bool {
    state
        .notifications()
        .toasts()
        .iter()
        .any(|toast| toast.message == text)
}

fn rendered_messages(state: &AppState) -> usize {
    state
        .active_view()
        .map(|view| view.engine().last_rendered_count())
        .unwrap_or(0)
}

#[test]
fn sidebar_lists_hub_sessions() {
    let hub = FakeHub::new();
    hub.put_session("alpha.jsonl", "");
    hub.put_session("beta.jsonl", "");

    let mut harness = AcceptanceTestHarness::start(hub, 100, 30).unwrap();
    let screen = harness.render_to_string();

    assert!(screen.contains("Sessions (2)"), "screen:\n{screen}");
    assert!(screen.contains("alpha.jsonl"));
    assert!(screen.contains("beta.jsonl"));
}

#[test]
fn empty_hub_shows_no_sessions() {
    let mut harness = AcceptanceTestHarness::start(FakeHub::new(), 100, 30).unwrap();
    let screen = harness.render_to_string();
    assert!(screen.contains(NO_SESSIONS), "screen:\n{screen}");
}

#[test]
fn unreachable_hub_raises_toast() {
    let hub = FakeHub::new();
    hub.set_failing(true);

    let mut harness = AcceptanceTestHarness::start(hub, 100, 30).unwrap();

    assert!(harness.wait_until(|state| has_toast(state, "Failed to load sessions")));
    let toast = &harness.state().notifications().toasts()[0];
    assert_eq!(toast.level, ToastLevel::Danger);
}

#[test]
fn opening_a_session_renders_its_transcript() {
    let hub = FakeHub::new();
    hub.put_session(
        "alpha.jsonl",
        &session_log(&["first question", "second question"]),
    );
    let mut harness = AcceptanceTestHarness::start(hub, 100, 30).unwrap();

    harness.send_key(KeyCode::Enter);
    assert!(harness.wait_until(|state| rendered_messages(state) == 2));

    assert_eq!(harness.state().focus, FocusPane::Chat);
    let screen = harness.render_to_string();
    assert!(screen.contains("first question"), "screen:\n{screen}");
    assert!(screen.contains("second question"));
    assert!(screen.contains(" alpha.jsonl "));
}

#[test]
fn session_without_messages_shows_placeholder() {
    let hub = FakeHub::new();
    hub.put_session("quiet.jsonl", "");
    let mut harness = AcceptanceTestHarness::start(hub, 100, 30).unwrap();

    harness.send_key(KeyCode::Enter);
    assert!(harness.wait_until(|state| {
        state
            .active_view()
            .is_some_and(|view| view.engine().shows_placeholder())
    }));

    let screen = harness.render_to_string();
    assert!(screen.contains(EMPTY_PLACEHOLDER), "screen:\n{screen}");
}

#[test]
fn missing_session_content_raises_toast() {
    let hub = FakeHub::new();
    hub.put_session("alpha.jsonl", "");
    let mut harness = AcceptanceTestHarness::start(hub, 100, 30).unwrap();
    // Listed, then the hub goes away before the session is opened.
    harness.hub().set_failing(true);

    harness.send_key(KeyCode::Enter);

    assert!(harness.wait_until(|state| has_toast(state, "Failed to load session")));
}

#[test]
fn sidebar_navigation_picks_second_session() {
    let hub = FakeHub::new();
    hub.put_session("alpha.jsonl", &session_log(&["from alpha"]));
    hub.put_session("beta.jsonl", &session_log(&["from beta"]));
    let mut harness = AcceptanceTestHarness::start(hub, 100, 30).unwrap();

    harness.send_key(KeyCode::Char('j'));
    harness.send_key(KeyCode::Enter);
    assert!(harness.wait_until(|state| rendered_messages(state) == 1));

    assert_eq!(
        harness.state().active_session().map(|id| id.as_str()),
        Some("beta.jsonl")
    );
    let screen = harness.render_to_string();
    assert!(screen.contains("from beta"));
    assert!(!screen.contains("from alpha"));
}

#[test]
fn max_lines_and_auto_scroll_toggles_report_state() {
    let mut harness = AcceptanceTestHarness::start(FakeHub::new(), 100, 30).unwrap();

    harness.send_key(KeyCode::Char('+'));
    assert!(has_toast(harness.state(), "Max lines: 25"));
    assert_eq!(harness.state().cache().max_lines(), 25);

    harness.send_key(KeyCode::Char('a'));
    assert!(has_toast(harness.state(), "Auto-scroll off"));
    assert!(!harness.state().cache().auto_scroll());

    let screen = harness.render_to_string();
    assert!(screen.contains("max lines 25"), "screen:\n{screen}");
}

#[test]
fn quit_stops_feed_readers() {
    let mut harness = AcceptanceTestHarness::start(FakeHub::new(), 100, 30).unwrap();

    assert!(harness.send_key(KeyCode::Char('q')));

    assert!(!harness.is_running());
    assert_eq!(harness.open_feeds(), 0);
}

#[test]
fn ctrl_c_quits_while_composing() {
    let mut harness = AcceptanceTestHarness::start(FakeHub::new(), 100, 30).unwrap();

    harness.send_key(KeyCode::Char('i'));
    harness.type_text("half a thought");

    assert!(harness.send_key_with_mods(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(!harness.is_running());
}
