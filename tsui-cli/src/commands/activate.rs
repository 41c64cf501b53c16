//! Activate connection command.

use crate::cli::GlobalArgs;
use crate::error::CliError;
use crate::util::{Session, create_runtime, find_profile, require_registry_mut};

/// Activate connection command handler
pub fn cmd_activate(globals: &GlobalArgs, name: &str) -> Result<(), CliError> {
    let session = Session::load(globals)?;
    let runtime = create_runtime()?;
    let mut panel = session.open_panel(&runtime)?;
    let registry = require_registry_mut(&mut panel)?;

    let profile = find_profile(registry, name)?;
    let id = profile.id.clone();
    let conn_name = profile.name.clone();

    registry.activate(&id)?;
    println!("Active connection: {conn_name} (ID: {id})");

    Ok(())
}
