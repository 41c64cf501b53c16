//! List connections command.

use std::fmt::Write as _;

use serde::Serialize;
use tsui_core::ConnectionProfile;

use crate::cli::{GlobalArgs, OutputFormat};
use crate::error::CliError;
use crate::util::{Session, create_runtime, require_registry};

/// List connections command handler
pub fn cmd_list(globals: &GlobalArgs, format: OutputFormat) -> Result<(), CliError> {
    let session = Session::load(globals)?;
    let runtime = create_runtime()?;
    let panel = session.open_panel(&runtime)?;
    let registry = require_registry(&panel)?;

    let profiles: Vec<&ConnectionProfile> = registry.profiles().iter().collect();
    let active_id = registry.active_id();

    match format {
        OutputFormat::Table => println!("{}", format_table(&profiles, active_id)),
        OutputFormat::Json => println!("{}", format_json(&profiles, active_id)?),
    }

    Ok(())
}

/// Format connections as a table string
///
/// The active connection is marked with `*`.
#[must_use]
pub fn format_table(profiles: &[&ConnectionProfile], active_id: Option<&str>) -> String {
    if profiles.is_empty() {
        return "No connections found.".to_string();
    }

    let mut output = String::new();

    let name_width = profiles
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let url_width = profiles
        .iter()
        .map(|p| p.url.len())
        .max()
        .unwrap_or(3)
        .max(3);
    let type_width = 10;

    let _ = writeln!(
        output,
        "  {:<name_width$}  {:<type_width$}  {:<url_width$}  SOURCE",
        "NAME", "TYPE", "URL"
    );
    let _ = writeln!(
        output,
        "  {:-<name_width$}  {:-<type_width$}  {:-<url_width$}  ------",
        "", "", ""
    );

    for profile in profiles {
        let marker = if active_id == Some(profile.id.as_str()) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(
            output,
            "{marker} {:<name_width$}  {:<type_width$}  {:<url_width$}  {}",
            profile.name,
            profile.backend_type.as_str(),
            profile.url,
            source_label(profile)
        );
    }

    output.trim_end().to_string()
}

#[derive(Serialize)]
struct ProfileRow<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    backend_type: &'a str,
    url: &'a str,
    source: &'a str,
    active: bool,
}

/// Format connections as JSON string
///
/// Passwords are never included.
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(
    profiles: &[&ConnectionProfile],
    active_id: Option<&str>,
) -> Result<String, CliError> {
    let rows: Vec<ProfileRow<'_>> = profiles
        .iter()
        .map(|p| ProfileRow {
            id: &p.id,
            name: &p.name,
            backend_type: p.backend_type.as_str(),
            url: &p.url,
            source: source_label(p),
            active: active_id == Some(p.id.as_str()),
        })
        .collect();

    serde_json::to_string_pretty(&rows)
        .map_err(|e| CliError::Config(format!("Failed to serialize connections: {e}")))
}

/// Label for where a profile came from
pub const fn source_label(profile: &ConnectionProfile) -> &'static str {
    if profile.is_user_managed() {
        "user"
    } else {
        "host"
    }
}
