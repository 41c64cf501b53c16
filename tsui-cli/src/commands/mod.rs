//! Command handler modules for the CLI.

mod activate;
mod add;
mod edit;
mod list;
mod mode;
mod remove;
mod show;
mod status;
mod sync_host;
mod watch;

use crate::cli::{Commands, GlobalArgs};
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(globals: &GlobalArgs, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::List { format } => list::cmd_list(globals, format),
        Commands::Show { name } => show::cmd_show(globals, &name),
        Commands::Add {
            name,
            url,
            backend_type,
            fields,
        } => add::cmd_add(globals, &name, &url, backend_type, fields),
        Commands::Edit {
            target,
            name,
            url,
            backend_type,
            fields,
        } => edit::cmd_edit(
            globals,
            &target,
            edit::EditParams {
                name,
                url,
                backend_type,
                fields,
            },
        ),
        Commands::Remove { name } => remove::cmd_remove(globals, &name),
        Commands::Activate { name } => activate::cmd_activate(globals, &name),
        Commands::SyncHost => sync_host::cmd_sync_host(globals),
        Commands::Mode => mode::cmd_mode(globals),
        Commands::Status => status::cmd_status(globals),
        Commands::Watch { admin } => watch::cmd_watch(globals, admin),
    }
}
