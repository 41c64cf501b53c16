//! Core data structures for `TimeseriesUI`
//!
//! This module contains the connection profile model persisted by the
//! registry, the draft type used at the edit boundary and the wire shape of
//! connections reported by the host server.

mod host;
mod profile;

pub use host::{HostConnection, name_from_url};
pub use profile::{
    BackendType, ConnectionProfile, Credentials, DEFAULT_PROFILE_NAME, EMBEDDED_PROFILE_ID,
    ProfileDraft, ProfileSource, UNTITLED_PROFILE_NAME,
};
