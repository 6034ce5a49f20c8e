//! One-shot commands run from the command line instead of the TUI.
//!
//! Each command makes its request and writes a human-readable result to `out`.
//! Failures come back as [`AppError`] for `main` to report.

use crate::export::export_session;
use crate::hub::{HubAddress, HubApi};
use crate::model::{AppError, SessionId};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Print the session directory, one session per line.
pub fn list_sessions(hub: &dyn HubApi, out: &mut impl Write) -> Result<(), AppError> {
    let sessions = hub.list_sessions()?;
    if sessions.is_empty() {
        writeln!(out, "No active sessions")?;
        return Ok(());
    }

    let width = sessions
        .iter()
        .map(|session| session.display_title().chars().count())
        .max()
        .unwrap_or(0);
    for session in &sessions {
        writeln!(
            out,
            "{:<width$}  {:>10}  {}",
            session.display_title(),
            session.display_size(),
            session.modified.local_date_time(),
        )?;
    }
    Ok(())
}

/// Send `message` to the hub's agent.
pub fn send(hub: &dyn HubApi, message: &str, out: &mut impl Write) -> Result<(), AppError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::EmptyMessage);
    }
    hub.send_message(message)?;
    info!(chars = message.chars().count(), "Message sent");
    writeln!(out, "Message sent successfully")?;
    Ok(())
}

/// Trigger the hub's emergency stop.
pub fn stop(hub: &dyn HubApi, out: &mut impl Write) -> Result<(), AppError> {
    hub.emergency_stop()?;
    writeln!(out, "Emergency Stop Triggered")?;
    Ok(())
}

/// Check the hub answers its health endpoint.
pub fn health(hub: &dyn HubApi, address: &HubAddress, out: &mut impl Write) -> Result<(), AppError> {
    hub.health()?;
    writeln!(out, "Successfully connected to hub at {address}")?;
    Ok(())
}

/// Export `session` as HTML into `dir` and print the file path.
pub fn export(
    hub: &dyn HubApi,
    session: &SessionId,
    dir: &Path,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let path = export_session(hub, dir, session, chrono::Utc::now())?;
    writeln!(out, "{}", path.display())?;
    Ok(())
}
