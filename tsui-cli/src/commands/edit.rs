//! Edit connection command.

use tsui_core::{BackendType, MutationOutcome, ProfileDraft};

use crate::cli::{GlobalArgs, ProfileFields};
use crate::error::CliError;
use crate::util::{Session, create_runtime, find_profile, require_registry_mut};

/// Parameters for the edit command
pub struct EditParams {
    pub name: Option<String>,
    pub url: Option<String>,
    pub backend_type: Option<BackendType>,
    pub fields: ProfileFields,
}

/// Edit connection command handler
pub fn cmd_edit(globals: &GlobalArgs, target: &str, params: EditParams) -> Result<(), CliError> {
    let session = Session::load(globals)?;
    let runtime = create_runtime()?;
    let mut panel = session.open_panel(&runtime)?;
    let registry = require_registry_mut(&mut panel)?;

    let profile = find_profile(registry, target)?;
    let id = profile.id.clone();
    let draft = apply_params(ProfileDraft::from(profile), params);

    match registry.edit(&id, draft)? {
        MutationOutcome::Applied => {
            let name = registry.get(&id).map(|p| p.name.clone()).unwrap_or_default();
            println!("Updated connection '{name}' (ID: {id})");
            Ok(())
        }
        MutationOutcome::Ignored => Err(CliError::ReadOnly(target.to_string())),
    }
}

/// Overlays the provided flags onto the profile's current values
fn apply_params(mut draft: ProfileDraft, params: EditParams) -> ProfileDraft {
    let EditParams {
        name,
        url,
        backend_type,
        fields,
    } = params;

    if let Some(name) = name {
        draft.name = name;
    }
    if let Some(url) = url {
        draft.url = url;
    }
    if let Some(backend_type) = backend_type {
        draft.backend_type = backend_type;
    }
    if let Some(username) = fields.username {
        draft.username = username;
    }
    if let Some(password) = fields.password {
        draft.password = password;
    }
    if fields.default_database.is_some() {
        draft.default_database = fields.default_database;
    }
    if fields.alertmanager_url.is_some() {
        draft.alertmanager_url = fields.alertmanager_url;
    }
    if fields.alertmanager_username.is_some() {
        draft.alertmanager_username = fields.alertmanager_username;
    }
    if fields.alertmanager_password.is_some() {
        draft.alertmanager_password = fields.alertmanager_password;
    }
    draft
}
