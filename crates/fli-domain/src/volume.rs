//! Volume shapes that flow between the manifest, the remote store, and the
//! working-volume registry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A named storage reference as declared by the application manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub name: String,
    #[serde(rename = "volumeset")]
    pub volume_set: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

impl VolumeSpec {
    pub fn new(name: impl Into<String>, volume_set: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume_set: volume_set.into(),
            branch: None,
            snapshot: None,
        }
    }

    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    #[must_use]
    pub fn with_snapshot(mut self, snapshot: impl Into<String>) -> Self {
        self.snapshot = Some(snapshot.into());
        self
    }

    /// Branch reference, treating blank values as unset.
    pub fn branch(&self) -> Option<&str> {
        non_blank(self.branch.as_deref())
    }

    /// Snapshot reference, treating blank values as unset.
    pub fn snapshot(&self) -> Option<&str> {
        non_blank(self.snapshot.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// A writable clone produced for one [`VolumeSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedVolume {
    /// Logical name used by the compose layer.
    pub name: String,
    /// Mount path reported by the remote store.
    pub volume_path: String,
    /// Generated `fli-<uuid>` identifier of the clone.
    pub volume_name: String,
    pub volume_set: String,
}

/// One persisted `(volume name, volume set)` line of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkingVolumeRecord {
    pub volume_name: String,
    pub volume_set: String,
}

impl WorkingVolumeRecord {
    pub fn new(volume_name: impl Into<String>, volume_set: impl Into<String>) -> Self {
        Self {
            volume_name: volume_name.into(),
            volume_set: volume_set.into(),
        }
    }
}

impl From<&ProvisionedVolume> for WorkingVolumeRecord {
    fn from(volume: &ProvisionedVolume) -> Self {
        Self::new(volume.volume_name.trim(), volume.volume_set.trim())
    }
}

/// Rejects values that cannot be stored in a comma separated registry line.
///
/// Returns the offending character on failure.
pub fn ensure_record_field(value: &str) -> Result<(), char> {
    match value.chars().find(|ch| matches!(ch, ',' | '\n' | '\r')) {
        Some(ch) => Err(ch),
        None => Ok(()),
    }
}

/// Maps each logical volume name to the path its clone is mounted at, in
/// provisioning order.
pub fn volume_mounts(volumes: &[ProvisionedVolume]) -> IndexMap<String, String> {
    volumes
        .iter()
        .map(|volume| (volume.name.clone(), volume.volume_path.clone()))
        .collect()
}
