//! Configuration file loading with precedence handling.

use crate::hub::{HubAddress, DEFAULT_HUB_IP, DEFAULT_HUB_PORT};
use crate::render::DEFAULT_MAX_LINES;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "HUBMON_CONFIG";
/// Environment variable overriding the hub host.
pub const HUB_IP_ENV: &str = "HUBMON_HUB_IP";
/// Environment variable overriding the hub port.
pub const HUB_PORT_ENV: &str = "HUBMON_HUB_PORT";

/// Errors that can occur during config loading and saving.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// Config could not be serialized back to TOML.
    #[error("Failed to serialize config: {0}")]
    SerializeError(String),

    /// No config location could be determined.
    #[error("No config file location available")]
    NoConfigPath,

    /// Failed to write the config file.
    #[error("Failed to write config file at {path}: {reason}")]
    WriteError {
        /// Path that failed to write.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/hubmon/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Hub host name or IP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_ip: Option<String>,

    /// Hub port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_port: Option<u16>,

    /// Maximum visible lines per message before truncation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<usize>,

    /// Pin the chat view to the newest message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scroll: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<PathBuf>,

    /// Directory HTML exports are written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Hub host.
    pub hub_ip: String,
    /// Hub port.
    pub hub_port: u16,
    /// Maximum visible lines per message.
    pub max_lines: usize,
    /// Auto-scroll on new content.
    pub auto_scroll: bool,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Directory for HTML exports.
    pub export_dir: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            hub_ip: DEFAULT_HUB_IP.to_string(),
            hub_port: DEFAULT_HUB_PORT,
            max_lines: DEFAULT_MAX_LINES,
            auto_scroll: true,
            log_file_path: default_log_path(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl ResolvedConfig {
    /// Hub address built from `hub_ip`/`hub_port`.
    pub fn hub_address(&self) -> HubAddress {
        HubAddress::new(self.hub_ip.clone(), self.hub_port)
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/hubmon/hubmon.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("hubmon").join("hubmon.log")
    } else {
        PathBuf::from("hubmon.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/hubmon/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hubmon").join("config.toml"))
}

/// Decide which config file is in effect.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `HUBMON_CONFIG` environment variable
/// 3. Default path `~/.config/hubmon/config.toml`
pub fn resolve_config_path(config_path: Option<PathBuf>) -> Option<PathBuf> {
    config_path
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
        .or_else(default_config_path)
}

/// Load configuration with precedence handling.
///
/// See [`resolve_config_path`] for which file is read. Missing config files
/// are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    match resolve_config_path(config_path) {
        Some(path) => load_config_file(path),
        None => Ok(None),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `HUBMON_HUB_IP`: Override hub host
/// - `HUBMON_HUB_PORT`: Override hub port (ignored unless a valid port)
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(host) = std::env::var(HUB_IP_ENV) {
        if !host.trim().is_empty() {
            config.hub_ip = host.trim().to_string();
        }
    }

    if let Ok(port) = std::env::var(HUB_PORT_ENV) {
        match port.trim().parse::<u16>() {
            Ok(port) if port != 0 => config.hub_port = port,
            _ => tracing::warn!(value = %port, "Ignoring invalid {HUB_PORT_ENV}"),
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        hub_ip: config.hub_ip.unwrap_or(defaults.hub_ip),
        hub_port: config.hub_port.unwrap_or(defaults.hub_port),
        max_lines: config.max_lines.unwrap_or(defaults.max_lines),
        auto_scroll: config.auto_scroll.unwrap_or(defaults.auto_scroll),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        export_dir: config.export_dir.unwrap_or(defaults.export_dir),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    host_override: Option<String>,
    port_override: Option<u16>,
    max_lines_override: Option<usize>,
    auto_scroll_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(host) = host_override {
        config.hub_ip = host;
    }

    if let Some(port) = port_override {
        config.hub_port = port;
    }

    if let Some(max_lines) = max_lines_override {
        config.max_lines = max_lines;
    }

    if let Some(auto_scroll) = auto_scroll_override {
        config.auto_scroll = auto_scroll;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
