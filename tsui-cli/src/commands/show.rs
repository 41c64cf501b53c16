//! Show connection details command.

use crate::cli::GlobalArgs;
use crate::commands::list::source_label;
use crate::error::CliError;
use crate::util::{Session, create_runtime, find_profile, mask, require_registry};

/// Show connection details command handler
pub fn cmd_show(globals: &GlobalArgs, name: &str) -> Result<(), CliError> {
    let session = Session::load(globals)?;
    let runtime = create_runtime()?;
    let panel = session.open_panel(&runtime)?;
    let registry = require_registry(&panel)?;

    let profile = find_profile(registry, name)?;
    let active = registry.active_id() == Some(profile.id.as_str());

    println!("Connection Details:");
    println!("  ID:       {}", profile.id);
    println!("  Name:     {}", profile.name);
    println!("  Type:     {}", profile.backend_type.display_name());
    println!("  URL:      {}", profile.url);
    println!("  Source:   {}", source_label(profile));
    if active {
        println!("  Active:   yes");
    }

    if !profile.username.is_empty() {
        println!("  Username: {}", profile.username);
        println!("  Password: {}", mask(&profile.password));
    }
    if let Some(ref db) = profile.default_database {
        println!("  Database: {db}");
    }
    if let Some(ref am) = profile.alertmanager_url {
        println!("  Alertmanager: {am}");
        if let Some(ref user) = profile.alertmanager_username {
            println!("    Username: {user}");
            println!(
                "    Password: {}",
                mask(profile.alertmanager_password.as_deref().unwrap_or_default())
            );
        }
    }

    Ok(())
}
