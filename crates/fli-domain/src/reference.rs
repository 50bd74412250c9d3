//! Picks the single remote reference a [`VolumeSpec`] is pulled and cloned from.
//!
//! Snapshots are more specific than branches, so a spec naming both resolves
//! to its snapshot.

use std::fmt;

use tracing::debug;

use crate::volume::VolumeSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeRef {
    Snapshot(String),
    Branch(String),
}

impl VolumeRef {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Snapshot(value) | Self::Branch(value) => value,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Branch(_) => "branch",
        }
    }

    /// Reference suffix used when pulling.
    ///
    /// The remote store cannot pull a single branch, so branch references
    /// pull the whole volume set.
    pub fn pull_ref(&self) -> Option<&str> {
        match self {
            Self::Snapshot(value) => Some(value),
            Self::Branch(_) => None,
        }
    }

    /// Reference used when cloning; both kinds clone directly.
    pub fn clone_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for VolumeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("[FLI101] volume '{name}' in volume set '{volume_set}' names neither a branch nor a snapshot")]
    Unspecified { name: String, volume_set: String },
}

impl ReferenceError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unspecified { .. } => "FLI101",
        }
    }
}

/// Resolves the reference for one spec.
pub fn resolve_reference(spec: &VolumeSpec) -> Result<VolumeRef, ReferenceError> {
    match (spec.snapshot(), spec.branch()) {
        (Some(snapshot), Some(branch)) => {
            debug!(
                volume = %spec.name,
                snapshot,
                branch,
                "both snapshot and branch set; using snapshot"
            );
            Ok(VolumeRef::Snapshot(snapshot.to_string()))
        }
        (Some(snapshot), None) => Ok(VolumeRef::Snapshot(snapshot.to_string())),
        (None, Some(branch)) => Ok(VolumeRef::Branch(branch.to_string())),
        (None, None) => Err(ReferenceError::Unspecified {
            name: spec.name.clone(),
            volume_set: spec.volume_set.clone(),
        }),
    }
}

/// Resolves every spec, failing on the first one without a usable reference.
pub fn resolve_all(specs: &[VolumeSpec]) -> Result<Vec<VolumeRef>, ReferenceError> {
    specs.iter().map(resolve_reference).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_only_resolves_to_snapshot() {
        let spec = VolumeSpec::new("db", "app-data").with_snapshot("snap-1");
        let reference = resolve_reference(&spec).unwrap();
        assert_eq!(reference, VolumeRef::Snapshot("snap-1".into()));
        assert_eq!(reference.pull_ref(), Some("snap-1"));
        assert_eq!(reference.clone_ref(), "snap-1");
    }

    #[test]
    fn branch_only_pulls_whole_volume_set() {
        let spec = VolumeSpec::new("db", "app-data").with_branch("main");
        let reference = resolve_reference(&spec).unwrap();
        assert_eq!(reference, VolumeRef::Branch("main".into()));
        assert_eq!(reference.pull_ref(), None);
        assert_eq!(reference.clone_ref(), "main");
    }

    #[test]
    fn snapshot_wins_over_branch() {
        for (snapshot, branch) in [("snap-1", "main"), ("s", "b"), ("x-2", "x-1")] {
            let spec = VolumeSpec::new("db", "app-data")
                .with_branch(branch)
                .with_snapshot(snapshot);
            let reference = resolve_reference(&spec).unwrap();
            assert_eq!(reference.as_str(), snapshot);
            assert_eq!(reference.kind(), "snapshot");
        }
    }

    #[test]
    fn missing_reference_is_rejected() {
        let spec = VolumeSpec::new("db", "app-data").with_branch(" ");
        let err = resolve_reference(&spec).unwrap_err();
        assert_eq!(err.code(), "FLI101");
        assert!(err.to_string().contains("'db'"), "{err}");
    }

    #[test]
    fn resolve_all_stops_at_first_invalid_spec() {
        let specs = vec![
            VolumeSpec::new("web", "app-data").with_branch("main"),
            VolumeSpec::new("db", "app-data"),
        ];
        let err = resolve_all(&specs).unwrap_err();
        assert_eq!(
            err,
            ReferenceError::Unspecified {
                name: "db".into(),
                volume_set: "app-data".into()
            }
        );
    }
}
