use std::fmt;

use fli_domain::WorkingVolumeRecord;
use serde::Serialize;
use tracing::{error, info};

use super::naming::lineage_branch;
use super::registry::RegistryError;
use super::VolumeContext;
use crate::gateway::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    SnapshotOnly,
    SnapshotAndPush,
}

impl CaptureMode {
    #[must_use]
    pub fn pushes(self) -> bool {
        matches!(self, Self::SnapshotAndPush)
    }
}

/// Step of a record's capture that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStage {
    Snapshot,
    Sync,
    Push,
}

impl fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Snapshot => "snapshot",
            Self::Sync => "sync",
            Self::Push => "push",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedSnapshot {
    pub volume_name: String,
    pub volume_set: String,
    pub branch: String,
    pub snapshot: String,
    pub pushed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("{stage} of working volume '{volume_name}' ({volume_set}) failed: {source}")]
    Stage {
        stage: CaptureStage,
        volume_name: String,
        volume_set: String,
        #[source]
        source: GatewayError,
    },
}

impl CaptureError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Registry(err) => err.code(),
            Self::Stage { source, .. } => source.code(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Registry(err) => err.reason(),
            Self::Stage { source, .. } => source.reason(),
        }
    }

    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Registry(err) => err.is_user_error(),
            Self::Stage { .. } => false,
        }
    }
}

/// Snapshots every registered working volume without publishing.
pub fn snapshot_working_volumes(
    ctx: &VolumeContext<'_>,
) -> Result<Vec<CapturedSnapshot>, CaptureError> {
    capture_working_volumes(ctx, CaptureMode::SnapshotOnly)
}

/// Snapshots every registered working volume, then syncs and pushes each
/// new snapshot.
pub fn snapshot_and_push_working_volumes(
    ctx: &VolumeContext<'_>,
) -> Result<Vec<CapturedSnapshot>, CaptureError> {
    capture_working_volumes(ctx, CaptureMode::SnapshotAndPush)
}

/// Captures registry records in order. The first failing step stops the
/// run; later records are not touched.
pub fn capture_working_volumes(
    ctx: &VolumeContext<'_>,
    mode: CaptureMode,
) -> Result<Vec<CapturedSnapshot>, CaptureError> {
    let records = ctx.registry().read_all()?;
    info!(
        records = records.len(),
        push = mode.pushes(),
        registry = %ctx.registry().location(),
        "capturing working volumes"
    );
    let mut captured = Vec::with_capacity(records.len());
    for record in &records {
        let snapshot = capture_one(ctx, record, mode).map_err(|err| {
            error!(volume = %record.volume_name, error = %err, "capture failed");
            err
        })?;
        captured.push(snapshot);
    }
    Ok(captured)
}

fn capture_one(
    ctx: &VolumeContext<'_>,
    record: &WorkingVolumeRecord,
    mode: CaptureMode,
) -> Result<CapturedSnapshot, CaptureError> {
    let store = ctx.store();
    let stage_err = |stage: CaptureStage| {
        move |source: GatewayError| CaptureError::Stage {
            stage,
            volume_name: record.volume_name.clone(),
            volume_set: record.volume_set.clone(),
            source,
        }
    };

    let snapshot = ctx.names().snapshot_name(&record.volume_name);
    let branch = lineage_branch(&record.volume_name);
    store
        .snapshot(&record.volume_set, &record.volume_name, &branch, &snapshot)
        .map_err(stage_err(CaptureStage::Snapshot))?;
    info!(volume = %record.volume_name, %snapshot, %branch, "snapshot created");

    if mode.pushes() {
        store
            .sync(&record.volume_set)
            .map_err(stage_err(CaptureStage::Sync))?;
        store
            .push(&record.volume_set, &snapshot)
            .map_err(stage_err(CaptureStage::Push))?;
        info!(volume_set = %record.volume_set, %snapshot, "snapshot pushed");
    }

    Ok(CapturedSnapshot {
        volume_name: record.volume_name.clone(),
        volume_set: record.volume_set.clone(),
        branch,
        snapshot,
        pushed: mode.pushes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Operation;
    use crate::volumes::{MemoryRegistry, UuidNames, VolumeRegistry};
    use crate::volumes::testing::{failed, Call, FakeStore, SequentialNames};

    fn registry_with(pairs: &[(&str, &str)]) -> MemoryRegistry {
        let registry = MemoryRegistry::new();
        let records: Vec<_> = pairs
            .iter()
            .map(|(name, set)| WorkingVolumeRecord::new(*name, *set))
            .collect();
        registry.write(&records).unwrap();
        registry
    }

    #[test]
    fn push_capture_runs_snapshot_sync_push_per_record_in_order() {
        let store = FakeStore::default();
        let registry = registry_with(&[("fli-a", "app-data"), ("fli-b", "logs")]);
        let names = UuidNames;
        let ctx = VolumeContext::new(&store, &registry, &names);

        let captured = snapshot_and_push_working_volumes(&ctx).unwrap();
        assert_eq!(captured.len(), 2);
        for (snapshot, volume) in captured.iter().zip(["fli-a", "fli-b"]) {
            let suffix = snapshot
                .snapshot
                .strip_prefix(&format!("{volume}-"))
                .unwrap();
            assert!(uuid::Uuid::parse_str(suffix).is_ok(), "{}", snapshot.snapshot);
            assert!(snapshot.pushed);
        }

        assert_eq!(
            store.calls(),
            vec![
                Call::Snapshot {
                    target: "app-data:fli-a".into(),
                    branch: "branch-fli-a".into(),
                    name: captured[0].snapshot.clone(),
                },
                Call::Sync("app-data".into()),
                Call::Push(format!("app-data:{}", captured[0].snapshot)),
                Call::Snapshot {
                    target: "logs:fli-b".into(),
                    branch: "branch-fli-b".into(),
                    name: captured[1].snapshot.clone(),
                },
                Call::Sync("logs".into()),
                Call::Push(format!("logs:{}", captured[1].snapshot)),
            ]
        );
    }

    #[test]
    fn snapshot_only_never_syncs_or_pushes() {
        let store = FakeStore::default();
        let registry = registry_with(&[("fli-a", "app-data")]);
        let names = SequentialNames::default();
        let ctx = VolumeContext::new(&store, &registry, &names);

        let captured = snapshot_working_volumes(&ctx).unwrap();
        assert_eq!(
            captured,
            vec![CapturedSnapshot {
                volume_name: "fli-a".into(),
                volume_set: "app-data".into(),
                branch: "branch-fli-a".into(),
                snapshot: "fli-a-id-1".into(),
                pushed: false,
            }]
        );
        assert_eq!(store.calls().len(), 1);
    }

    #[test]
    fn first_record_failure_stops_before_second_record() {
        let store = FakeStore::default();
        store.fail_on(
            "snapshot app-data:fli-a",
            failed(Operation::Snapshot, "fli snapshot -b branch-fli-a app-data:fli-a"),
        );
        let registry = registry_with(&[("fli-a", "app-data"), ("fli-b", "logs")]);
        let names = SequentialNames::default();
        let ctx = VolumeContext::new(&store, &registry, &names);

        let err = snapshot_and_push_working_volumes(&ctx).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Stage { stage: CaptureStage::Snapshot, ref volume_name, .. }
                if volume_name == "fli-a"
        ));
        assert_eq!(err.code(), "FLI202");
        assert_eq!(store.calls().len(), 1);
    }

    #[test]
    fn push_failure_is_attributed_to_push_stage() {
        let store = FakeStore::default();
        store.fail_on("push logs:fli-b-id-2", failed(Operation::Push, "fli push"));
        let registry = registry_with(&[("fli-a", "app-data"), ("fli-b", "logs")]);
        let names = SequentialNames::default();
        let ctx = VolumeContext::new(&store, &registry, &names);

        let err = snapshot_and_push_working_volumes(&ctx).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Stage { stage: CaptureStage::Push, ref volume_set, .. } if volume_set == "logs"
        ));
    }

    #[test]
    fn missing_registry_is_a_user_error_and_touches_nothing() {
        let store = FakeStore::default();
        let registry = MemoryRegistry::new();
        let names = SequentialNames::default();
        let ctx = VolumeContext::new(&store, &registry, &names);

        let err = snapshot_working_volumes(&ctx).unwrap_err();
        assert!(err.is_user_error());
        assert_eq!(err.code(), "FLI301");
        assert!(store.calls().is_empty());
    }

    #[test]
    fn empty_registry_captures_nothing() {
        let store = FakeStore::default();
        let registry = registry_with(&[]);
        let names = SequentialNames::default();
        let ctx = VolumeContext::new(&store, &registry, &names);

        assert!(snapshot_and_push_working_volumes(&ctx).unwrap().is_empty());
        assert!(store.calls().is_empty());
    }
}
