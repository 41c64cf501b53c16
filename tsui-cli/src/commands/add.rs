//! Add connection command.

use tsui_core::{BackendType, ProfileDraft};

use crate::cli::{GlobalArgs, ProfileFields};
use crate::error::CliError;
use crate::util::{Session, create_runtime, require_registry_mut};

/// Add connection command handler
pub fn cmd_add(
    globals: &GlobalArgs,
    name: &str,
    url: &str,
    backend_type: BackendType,
    fields: ProfileFields,
) -> Result<(), CliError> {
    let draft = build_draft(name, url, backend_type, fields);

    let session = Session::load(globals)?;
    let runtime = create_runtime()?;
    let mut panel = session.open_panel(&runtime)?;
    let registry = require_registry_mut(&mut panel)?;

    let id = registry.add(draft)?;
    let name = registry.get(&id).map(|p| p.name.clone()).unwrap_or_default();
    let activated = registry.active_id() == Some(id.as_str());

    println!("Created connection '{name}' (ID: {id})");
    if activated {
        println!("Connection '{name}' is now active");
    }

    Ok(())
}

fn build_draft(
    name: &str,
    url: &str,
    backend_type: BackendType,
    fields: ProfileFields,
) -> ProfileDraft {
    let mut draft = ProfileDraft::new(url)
        .with_name(name)
        .with_type(backend_type)
        .with_credentials(
            fields.username.unwrap_or_default(),
            fields.password.unwrap_or_default(),
        );
    if let Some(database) = fields.default_database {
        draft = draft.with_default_database(database);
    }
    if let Some(alertmanager_url) = fields.alertmanager_url {
        draft = draft.with_alertmanager(
            alertmanager_url,
            fields.alertmanager_username,
            fields.alertmanager_password,
        );
    }
    draft
}
