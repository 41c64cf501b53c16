//! Merge host-supplied connections command.

use tsui_core::{ConnectionProfile, ConnectionRegistry, ProfileSource};

use crate::cli::GlobalArgs;
use crate::error::CliError;
use crate::util::{Session, create_runtime, require_registry};

/// Sync-host command handler
///
/// Fetches the host's connection list and appends every URL not yet in the
/// registry. Unlike panel startup, a failed fetch is reported as an error.
pub fn cmd_sync_host(globals: &GlobalArgs) -> Result<(), CliError> {
    let session = Session::load(globals)?;
    let Some(host) = session.host.clone() else {
        return Err(CliError::Config(
            "No host configured; pass --host or set host_url in config.toml".to_string(),
        ));
    };

    let store = session.open_store()?;
    let before = count_host_profiles(&ConnectionRegistry::load(store.as_ref()));

    let runtime = create_runtime()?;
    let mut panel = session.start_panel(&runtime, store)?;
    let on_start = count_host_profiles(require_registry(&panel)?.profiles()).saturating_sub(before);

    let refreshed = runtime.block_on(panel.refresh_host_connections())?;

    let registry = require_registry(&panel)?;
    println!("{}", merge_summary(&host, on_start + refreshed, registry.len()));

    Ok(())
}

/// Profiles that came from the host; a seeded "Default" is not one of them
fn count_host_profiles(profiles: &[ConnectionProfile]) -> usize {
    profiles
        .iter()
        .filter(|p| p.source == ProfileSource::Cli)
        .count()
}

fn merge_summary(host: &str, added: usize, total: usize) -> String {
    format!("Merged {added} new connection(s) from {host} ({total} total)")
}
