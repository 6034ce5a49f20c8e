//! Hub Monitor - Entry Point

use clap::{Parser, Subcommand};
use hubmon::commands;
use hubmon::config::{loader, ResolvedConfig};
use hubmon::hub::HubClient;
use hubmon::model::SessionId;
use std::path::PathBuf;
use tracing::info;

/// Hub Monitor - TUI for watching and steering a remote agent hub
#[derive(Parser, Debug)]
#[command(name = "hubmon")]
#[command(version)]
#[command(about = "TUI monitor for a remote agent hub")]
pub struct Args {
    /// Hub host name or IP
    #[arg(long)]
    pub host: Option<String>,

    /// Hub port
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Lines shown per message before "Show More"
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub max_lines: Option<u64>,

    /// Keep the view where it is when content arrives
    #[arg(long)]
    pub no_auto_scroll: bool,

    /// One-shot command; starts the TUI when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One-shot commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List the hub's sessions
    Sessions,
    /// Send a message to the agent
    Send {
        /// Message text
        message: String,
    },
    /// Trigger the emergency stop
    Stop,
    /// Check that the hub is reachable
    Health,
    /// Export a session transcript to HTML
    Export {
        /// Session id, e.g. `abc123.jsonl`
        session: String,
        /// Output directory (defaults to the configured export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn resolve_config(args: &Args) -> Result<ResolvedConfig, Box<dyn std::error::Error>> {
    // Defaults → Config File → Env Vars → CLI Args
    let config_file = loader::load_config_with_precedence(args.config.clone())?;
    let merged = loader::merge_config(config_file);
    let with_env = loader::apply_env_overrides(merged);

    let max_lines = args
        .max_lines
        .map(usize::try_from)
        .transpose()?;
    let auto_scroll = if args.no_auto_scroll { Some(false) } else { None };

    Ok(loader::apply_cli_overrides(
        with_env,
        args.host.clone(),
        args.port,
        max_lines,
        auto_scroll,
    ))
}

fn run_command(command: Command, config: &ResolvedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let address = config.hub_address();
    let hub = HubClient::new(address.clone());
    let mut out = std::io::stdout().lock();

    match command {
        Command::Sessions => commands::list_sessions(&hub, &mut out)?,
        Command::Send { message } => commands::send(&hub, &message, &mut out)?,
        Command::Stop => commands::stop(&hub, &mut out)?,
        Command::Health => commands::health(&hub, &address, &mut out)?,
        Command::Export { session, output } => {
            let session = SessionId::new(session)?;
            let dir = output.unwrap_or_else(|| config.export_dir.clone());
            commands::export(&hub, &session, &dir, &mut out)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    match args.command {
        Some(command) => {
            hubmon::logging::init_stderr()?;
            run_command(command, &config)
        }
        None => {
            // The TUI owns the terminal, so tracing goes to the log file.
            hubmon::logging::init(&config.log_file_path)?;
            info!(config = ?config, "Configuration loaded and resolved");

            let config_path = loader::resolve_config_path(args.config.clone());
            hubmon::view::run_tui(&config, config_path)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["hubmon", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["hubmon", "--version"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_starts_tui_with_defaults() {
        let args = Args::parse_from(["hubmon"]);
        assert_eq!(args.host, None);
        assert_eq!(args.port, None);
        assert_eq!(args.max_lines, None);
        assert!(!args.no_auto_scroll);
        assert_eq!(args.command, None);
    }

    #[test]
    fn test_global_flags() {
        let args = Args::parse_from([
            "hubmon",
            "--host",
            "10.0.0.5",
            "--port",
            "4000",
            "--max-lines",
            "40",
            "--no-auto-scroll",
        ]);
        assert_eq!(args.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(args.port, Some(4000));
        assert_eq!(args.max_lines, Some(40));
        assert!(args.no_auto_scroll);
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(Args::try_parse_from(["hubmon", "--port", "0"]).is_err());
    }

    #[test]
    fn test_max_lines_out_of_range_rejected() {
        assert!(Args::try_parse_from(["hubmon", "--max-lines", "0"]).is_err());
        assert!(Args::try_parse_from(["hubmon", "--max-lines", "1001"]).is_err());
    }

    #[test]
    fn test_send_subcommand() {
        let args = Args::parse_from(["hubmon", "send", "hello there"]);
        assert_eq!(
            args.command,
            Some(Command::Send {
                message: "hello there".to_string()
            })
        );
    }

    #[test]
    fn test_export_subcommand_with_output() {
        let args = Args::parse_from(["hubmon", "export", "a.jsonl", "-o", "/tmp/out"]);
        assert_eq!(
            args.command,
            Some(Command::Export {
                session: "a.jsonl".to_string(),
                output: Some(PathBuf::from("/tmp/out")),
            })
        );
    }

    #[test]
    fn test_cli_flags_override_resolved_config() {
        let args = Args::parse_from([
            "hubmon",
            "--config",
            "/nonexistent/hubmon/config.toml",
            "--host",
            "hub.local",
            "--no-auto-scroll",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.hub_ip, "hub.local");
        assert!(!config.auto_scroll);
    }
}
