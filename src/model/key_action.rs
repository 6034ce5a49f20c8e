//! Domain-level keyboard actions independent of key bindings.

/// Domain-level actions that can be mapped to key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// crossterm::event::KeyEvent to KeyAction is handled by KeyBindings.
/// Text entry (composer, settings fields, confirmation prompt) bypasses the
/// bindings entirely while a modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// Move up one line in the focused pane. Default: k/↑
    ScrollUp,
    /// Move down one line in the focused pane. Default: j/↓
    ScrollDown,
    /// Scroll up by one page. Default: Ctrl+u/Page Up
    PageUp,
    /// Scroll down by one page. Default: Ctrl+d/Page Down
    PageDown,
    /// Jump to the top of the focused pane. Default: g/Home
    ScrollToTop,
    /// Jump to the newest content and re-pin the chat view. Default: G/End
    ScrollToBottom,

    // Focus navigation
    /// Cycle focus between the session list and the chat pane. Default: Tab
    CycleFocus,
    /// Open the selected session (sidebar) or toggle the focused message (chat). Default: Enter
    Activate,

    // Message interaction
    /// Focus the next message bubble. Default: Ctrl+j
    NextEntry,
    /// Focus the previous message bubble. Default: Ctrl+k
    PrevEntry,
    /// Toggle "Show More"/"Show Less" on the focused message. Default: Space
    ToggleExpand,
    /// Raise the maximum visible lines per message. Default: +
    IncreaseMaxLines,
    /// Lower the maximum visible lines per message. Default: -
    DecreaseMaxLines,
    /// Toggle auto-scroll to newest content. Default: a
    ToggleAutoScroll,

    // Operator commands
    /// Open the message composer. Default: i
    Compose,
    /// Ask for confirmation, then send the emergency stop. Default: X
    EmergencyStop,
    /// Export the active session to HTML. Default: e
    Export,
    /// Probe `/api/health`. Default: t
    TestConnection,
    /// Open hub address settings. Default: s
    OpenSettings,
    /// Refresh the session directory now. Default: r
    RefreshSessions,
    /// Drop and re-open the live feed. Default: R
    Reconnect,

    // Application
    /// Exit the application. Default: q/Ctrl+c
    Quit,
    /// Show help overlay with keyboard shortcuts. Default: ?
    Help,
}
