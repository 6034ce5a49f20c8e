//! Modal input states layered over the main screen.

use crate::hub::{HubAddress, DEFAULT_HUB_IP};
use crate::state::input::TextInput;

/// Question shown before an emergency stop is sent.
pub const STOP_CONFIRMATION: &str =
    "Are you sure you want to STOP bot? This will terminate all agent processes.";

/// Which surface receives key presses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    /// Key bindings drive the sidebar and chat pane.
    #[default]
    Normal,
    /// Keys edit the message composer.
    Composing,
    /// Keys edit the hub address form.
    Settings(SettingsForm),
    /// Waiting for the operator to confirm an emergency stop.
    ConfirmStop,
    /// Key reference overlay.
    Help,
}

/// Field of the settings form with the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettingsField {
    /// Hub host.
    #[default]
    Host,
    /// Hub port.
    Port,
}

/// Hub address being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    /// Host input.
    pub host: TextInput,
    /// Port input.
    pub port: TextInput,
    /// Focused field.
    pub field: SettingsField,
}

impl SettingsForm {
    /// Form pre-filled from the address in use.
    pub fn from_address(address: &HubAddress) -> Self {
        Self {
            host: TextInput::with_value(address.host.clone()),
            port: TextInput::with_value(address.port.to_string()),
            field: SettingsField::Host,
        }
    }

    /// Move the cursor to the other field.
    pub fn switch_field(&mut self) {
        self.field = match self.field {
            SettingsField::Host => SettingsField::Port,
            SettingsField::Port => SettingsField::Host,
        };
    }

    /// Input under the cursor.
    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.field {
            SettingsField::Host => &mut self.host,
            SettingsField::Port => &mut self.port,
        }
    }

    /// Address described by the form.
    ///
    /// A blank host means `localhost`; an unusable port means 3002.
    pub fn address(&self) -> HubAddress {
        let host = match self.host.value().trim() {
            "" => DEFAULT_HUB_IP,
            host => host,
        };
        HubAddress::new(host, HubAddress::parse_port(self.port.value()))
    }
}
