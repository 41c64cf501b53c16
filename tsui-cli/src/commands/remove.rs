//! Remove connection command.

use tsui_core::MutationOutcome;

use crate::cli::GlobalArgs;
use crate::error::CliError;
use crate::util::{Session, create_runtime, find_profile, require_registry_mut};

/// Remove connection command handler
pub fn cmd_remove(globals: &GlobalArgs, name: &str) -> Result<(), CliError> {
    let session = Session::load(globals)?;
    let runtime = create_runtime()?;
    let mut panel = session.open_panel(&runtime)?;
    let registry = require_registry_mut(&mut panel)?;

    let profile = find_profile(registry, name)?;
    let id = profile.id.clone();
    let conn_name = profile.name.clone();

    match registry.remove(&id)? {
        MutationOutcome::Applied => {
            println!("Deleted connection '{conn_name}' (ID: {id})");
            match registry.active() {
                Some(active) => println!("Active connection: {}", active.name),
                None => println!("No active connection"),
            }
            Ok(())
        }
        MutationOutcome::Ignored => Err(CliError::ReadOnly(conn_name)),
    }
}
