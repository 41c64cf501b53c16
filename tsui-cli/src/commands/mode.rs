//! Mode detection command.

use tsui_core::detect_mode;

use crate::cli::GlobalArgs;
use crate::error::CliError;
use crate::util::{Session, create_runtime};

/// Mode command handler
pub fn cmd_mode(globals: &GlobalArgs) -> Result<(), CliError> {
    let session = Session::load(globals)?;
    let client = session.client()?;
    let runtime = create_runtime()?;

    let info = runtime.block_on(detect_mode(client.as_ref()));

    println!("Mode:     {}", info.mode);
    println!("Host:     {}", session.host.as_deref().unwrap_or("(none)"));
    if let Some(ref url) = info.default_url {
        println!("Default:  {url}");
    }
    println!("Write:    {}", enabled_label(info.write_enabled));
    println!("Admin:    {}", enabled_label(info.admin_enabled));

    Ok(())
}

const fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}
