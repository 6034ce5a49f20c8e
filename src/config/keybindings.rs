//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::KeyEvent;
use std::collections::HashMap;

/// Maps keyboard events to domain actions.
///
/// Provides default vim-style bindings. Text entry in modal overlays is
/// handled before bindings are consulted.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&key).copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        use crossterm::event::{KeyCode, KeyModifiers};

        let mut bindings = HashMap::new();
        let mut bind = |code: KeyCode, modifiers: KeyModifiers, action: KeyAction| {
            bindings.insert(KeyEvent::new(code, modifiers), action);
        };

        // Vim-style scrolling
        bind(KeyCode::Char('j'), KeyModifiers::NONE, KeyAction::ScrollDown);
        bind(KeyCode::Char('k'), KeyModifiers::NONE, KeyAction::ScrollUp);
        bind(KeyCode::Char('g'), KeyModifiers::NONE, KeyAction::ScrollToTop);
        bind(KeyCode::Char('G'), KeyModifiers::SHIFT, KeyAction::ScrollToBottom);

        // Arrow and navigation keys
        bind(KeyCode::Up, KeyModifiers::NONE, KeyAction::ScrollUp);
        bind(KeyCode::Down, KeyModifiers::NONE, KeyAction::ScrollDown);
        bind(KeyCode::Home, KeyModifiers::NONE, KeyAction::ScrollToTop);
        bind(KeyCode::End, KeyModifiers::NONE, KeyAction::ScrollToBottom);

        // Page navigation
        bind(KeyCode::Char('d'), KeyModifiers::CONTROL, KeyAction::PageDown);
        bind(KeyCode::Char('u'), KeyModifiers::CONTROL, KeyAction::PageUp);
        bind(KeyCode::PageDown, KeyModifiers::NONE, KeyAction::PageDown);
        bind(KeyCode::PageUp, KeyModifiers::NONE, KeyAction::PageUp);

        // Focus
        bind(KeyCode::Tab, KeyModifiers::NONE, KeyAction::CycleFocus);
        bind(KeyCode::Enter, KeyModifiers::NONE, KeyAction::Activate);

        // Message navigation
        bind(KeyCode::Char('j'), KeyModifiers::CONTROL, KeyAction::NextEntry);
        bind(KeyCode::Char('k'), KeyModifiers::CONTROL, KeyAction::PrevEntry);
        bind(KeyCode::Char(' '), KeyModifiers::NONE, KeyAction::ToggleExpand);
        bind(KeyCode::Char('+'), KeyModifiers::NONE, KeyAction::IncreaseMaxLines);
        bind(KeyCode::Char('+'), KeyModifiers::SHIFT, KeyAction::IncreaseMaxLines);
        bind(KeyCode::Char('='), KeyModifiers::NONE, KeyAction::IncreaseMaxLines);
        bind(KeyCode::Char('-'), KeyModifiers::NONE, KeyAction::DecreaseMaxLines);
        bind(KeyCode::Char('a'), KeyModifiers::NONE, KeyAction::ToggleAutoScroll);

        // Operator commands
        bind(KeyCode::Char('i'), KeyModifiers::NONE, KeyAction::Compose);
        bind(KeyCode::Char('X'), KeyModifiers::SHIFT, KeyAction::EmergencyStop);
        bind(KeyCode::Char('e'), KeyModifiers::NONE, KeyAction::Export);
        bind(KeyCode::Char('t'), KeyModifiers::NONE, KeyAction::TestConnection);
        bind(KeyCode::Char('s'), KeyModifiers::NONE, KeyAction::OpenSettings);
        bind(KeyCode::Char('r'), KeyModifiers::NONE, KeyAction::RefreshSessions);
        bind(KeyCode::Char('R'), KeyModifiers::SHIFT, KeyAction::Reconnect);

        // Application
        bind(KeyCode::Char('q'), KeyModifiers::NONE, KeyAction::Quit);
        bind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyAction::Quit);
        bind(KeyCode::Char('?'), KeyModifiers::NONE, KeyAction::Help);
        bind(KeyCode::Char('?'), KeyModifiers::SHIFT, KeyAction::Help);

        Self { bindings }
    }
}
