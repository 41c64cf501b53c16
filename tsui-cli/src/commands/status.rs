//! Health status command.

use tsui_core::{ControlPanel, HealthState, HealthStatus};

use crate::cli::GlobalArgs;
use crate::error::CliError;
use crate::util::{Session, create_runtime};

/// Status command handler
///
/// Probes the active connection once. A disconnected result exits with the
/// connection failure code.
pub fn cmd_status(globals: &GlobalArgs) -> Result<(), CliError> {
    let session = Session::load(globals)?;
    let runtime = create_runtime()?;
    let panel = session.open_panel(&runtime)?;

    let status = runtime.block_on(panel.check_health());
    let Some(name) = connection_label(&panel, &status) else {
        return Err(CliError::HealthCheckFailed("No active connection".to_string()));
    };

    println!("Connection: {name}");
    println!("Status:     {}", status.state);
    if let Some(ref version) = status.version {
        println!("Version:    {version}");
    }

    if status.state == HealthState::Connected {
        Ok(())
    } else {
        Err(CliError::HealthCheckFailed(format!("'{name}' is unreachable")))
    }
}

/// Name and URL of the connection a status refers to
pub fn connection_label(panel: &ControlPanel, status: &HealthStatus) -> Option<String> {
    let id = status.profile_id.as_deref()?;
    let active = panel.dispatcher().current();
    let profile = active
        .profile
        .as_ref()
        .filter(|p| p.id == id)
        .or_else(|| panel.registry().and_then(|r| r.get(id)))?;
    Some(format!("{} ({})", profile.name, profile.url))
}

/// One line describing a status change
pub fn format_status_line(label: &str, status: &HealthStatus) -> String {
    let time = status
        .checked_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    match status.version {
        Some(ref version) => format!("[{time}] {label}: {} (version {version})", status.state),
        None => format!("[{time}] {label}: {}", status.state),
    }
}
