use anyhow::Result;
use serde_json::json;

use crate::context::CommandContext;
use crate::outcome::ExecutionOutcome;
use crate::tooling::registry_error_outcome;
use crate::volumes::VolumeRegistry;

pub struct VolumesRequest;

/// Lists the working volumes recorded by the last provisioning run.
///
/// # Errors
/// Returns an error only for failures outside the registry read, which is
/// reported as an outcome.
pub fn list_working_volumes(
    ctx: &CommandContext,
    _request: &VolumesRequest,
) -> Result<ExecutionOutcome> {
    let registry = ctx.registry();
    let records = match registry.read_all() {
        Ok(records) => records,
        Err(err) => return Ok(registry_error_outcome(&err)),
    };
    let location = registry.location();
    if records.is_empty() {
        return Ok(ExecutionOutcome::success(
            format!("no working volumes recorded in {location}"),
            json!({ "registry": location, "volumes": records }),
        ));
    }
    let listing = records
        .iter()
        .map(|record| format!("{}  {}", record.volume_name, record.volume_set))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(ExecutionOutcome::success(
        format!("working volumes:\n{listing}"),
        json!({ "registry": location, "volumes": records }),
    ))
}
