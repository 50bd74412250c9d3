#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod manifest;
pub mod reference;
pub mod volume;

pub use manifest::{HubSettings, Manifest, ManifestError, DEFAULT_MANIFEST};
pub use reference::{resolve_all, resolve_reference, ReferenceError, VolumeRef};
pub use volume::{
    ensure_record_field, volume_mounts, ProvisionedVolume, VolumeSpec, WorkingVolumeRecord,
};
