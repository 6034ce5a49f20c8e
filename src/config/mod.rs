//! Configuration module.
//!
//! Settings resolve in layers (defaults → file → environment → CLI) through
//! [`loader`]. [`ConfigStore`] writes operator changes made in the settings
//! overlay back to the same file.

pub mod keybindings;
pub mod loader;

pub use keybindings::KeyBindings;
pub use loader::{ConfigError, ConfigFile, ResolvedConfig};

use crate::hub::HubAddress;
use std::path::{Path, PathBuf};

/// Read/write access to the resolved config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Store backed by `path`. `None` means no config location is known and
    /// saving fails.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Backing file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist the hub address, keeping every other setting in the file.
    pub fn save_hub_address(&self, address: &HubAddress) -> Result<PathBuf, ConfigError> {
        let path = self.path.clone().ok_or(ConfigError::NoConfigPath)?;

        let mut file = loader::load_config_file(&path)?.unwrap_or_default();
        file.hub_ip = Some(address.host.clone());
        file.hub_port = Some(address.port);

        let contents =
            toml::to_string_pretty(&file).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        std::fs::write(&path, contents).map_err(|e| ConfigError::WriteError {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(path = %path.display(), %address, "Saved hub address");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_config(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("hubmon-store-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn save_creates_file_and_round_trips() {
        let path = temp_config("create");
        let store = ConfigStore::new(Some(path.clone()));

        store
            .save_hub_address(&HubAddress::new("10.1.2.3", 4000))
            .expect("save");

        let file = loader::load_config_file(&path).unwrap().unwrap();
        assert_eq!(file.hub_ip.as_deref(), Some("10.1.2.3"));
        assert_eq!(file.hub_port, Some(4000));
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn save_preserves_other_settings() {
        let path = temp_config("preserve");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "max_lines = 7\nauto_scroll = false\nhub_port = 1\n").unwrap();
        let store = ConfigStore::new(Some(path.clone()));

        store
            .save_hub_address(&HubAddress::new("hub", 3003))
            .expect("save");

        let file = loader::load_config_file(&path).unwrap().unwrap();
        assert_eq!(file.max_lines, Some(7));
        assert_eq!(file.auto_scroll, Some(false));
        assert_eq!(file.hub_port, Some(3003));
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn save_without_path_fails() {
        let store = ConfigStore::new(None);
        assert_eq!(
            store.save_hub_address(&HubAddress::default()),
            Err(ConfigError::NoConfigPath)
        );
    }
}
