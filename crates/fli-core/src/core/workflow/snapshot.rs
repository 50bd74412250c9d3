use anyhow::Result;
use serde_json::json;

use super::missing_store;
use crate::context::CommandContext;
use crate::outcome::ExecutionOutcome;
use crate::tooling::capture_error_outcome;
use crate::volumes::{capture_working_volumes, CaptureMode, UuidNames, VolumeContext};

#[derive(Clone, Debug, Default)]
pub struct SnapshotRequest {
    /// Sync and push each new snapshot after creating it.
    pub push: bool,
}

/// Snapshots every working volume recorded by the last provisioning run.
///
/// # Errors
/// Returns an error only for failures outside registry reads and store
/// invocations, which are reported as outcomes.
pub fn snapshot(ctx: &CommandContext, request: &SnapshotRequest) -> Result<ExecutionOutcome> {
    if let Some(outcome) = missing_store(ctx) {
        return Ok(outcome);
    }
    let mode = if request.push {
        CaptureMode::SnapshotAndPush
    } else {
        CaptureMode::SnapshotOnly
    };
    let store = ctx.remote_store();
    let registry = ctx.registry();
    let names = UuidNames;
    let volumes = VolumeContext::new(&store, &registry, &names);
    let captured = match capture_working_volumes(&volumes, mode) {
        Ok(captured) => captured,
        Err(err) => return Ok(capture_error_outcome(&err)),
    };

    let verb = if request.push {
        "captured and pushed"
    } else {
        "captured"
    };
    let mut message = format!("{verb} {} snapshot(s)", captured.len());
    for snapshot in &captured {
        message.push_str(&format!(
            "\n  {} -> {}:{}",
            snapshot.volume_name, snapshot.volume_set, snapshot.snapshot
        ));
    }
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "pushed": request.push,
            "snapshots": captured,
            "registry": registry.path().display().to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use tempfile::tempdir;

    use crate::config::GlobalOptions;
    use crate::outcome::CommandStatus;
    use crate::core::workflow::testing::{context, FakeFli};

    #[test]
    fn push_snapshots_every_registered_volume() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join(".flidockervols"),
            "fli-a,app-data\nfli-b,logs\n",
        )
        .unwrap();
        let global = GlobalOptions::default();
        let fli = Arc::new(FakeFli::default());
        let ctx = context(&global, &fli, temp.path());

        let outcome = snapshot(&ctx, &SnapshotRequest { push: true }).unwrap();
        assert_eq!(outcome.status, CommandStatus::Ok, "{outcome:?}");
        let snapshots = outcome.details["snapshots"].as_array().unwrap();
        assert_eq!(snapshots.len(), 2);
        let first = snapshots[0]["snapshot"].as_str().unwrap();
        assert!(first.starts_with("fli-a-"));

        let calls = fli.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(
            calls[0],
            format!("snapshot -b branch-fli-a app-data:fli-a {first}")
        );
        assert_eq!(calls[1], "sync app-data");
        assert_eq!(calls[2], format!("push app-data:{first}"));
        assert!(calls[3].starts_with("snapshot -b branch-fli-b logs:fli-b fli-b-"));
    }

    #[test]
    fn snapshot_without_registry_asks_for_provisioning() {
        let temp = tempdir().unwrap();
        let global = GlobalOptions::default();
        let fli = Arc::new(FakeFli::default());
        let ctx = context(&global, &fli, temp.path());

        let outcome = snapshot(&ctx, &SnapshotRequest::default()).unwrap();
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["reason"], "registry_missing");
        assert!(fli.calls().is_empty());
    }

    #[test]
    fn failed_snapshot_stops_the_run() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join(".flidockervols"),
            "fli-a,app-data\nfli-b,logs\n",
        )
        .unwrap();
        let global = GlobalOptions::default();
        let fli = Arc::new(FakeFli::default());
        fli.reply("sync app-data", 4, "hub unreachable");
        let ctx = context(&global, &fli, temp.path());

        let outcome = snapshot(&ctx, &SnapshotRequest { push: true }).unwrap();
        assert_eq!(outcome.status, CommandStatus::Failure);
        assert_eq!(outcome.details["stage"], "sync");
        assert_eq!(outcome.details["volume_name"], "fli-a");
        assert_eq!(fli.calls().len(), 2);
    }
}
