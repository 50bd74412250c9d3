use color_eyre::Result;
use fli_core::{
    CommandContext, CommandGroup, CommandInfo, ConfigureRequest, InfoRequest, ProvisionRequest,
    SnapshotRequest, VolumesRequest,
};
use tracing::debug;

use crate::cli::{CommandGroupCli, HubArgs};

pub fn dispatch_command(
    ctx: &CommandContext,
    group: &CommandGroupCli,
) -> Result<(CommandInfo, fli_core::ExecutionOutcome)> {
    match group {
        CommandGroupCli::Provision(args) => {
            let info = CommandInfo::new(CommandGroup::Provision, "provision");
            let request = ProvisionRequest {
                manifest: args.manifest.clone(),
                endpoint: args.hub.endpoint.clone(),
                token_file: args.hub.token_file.clone(),
            };
            core_call(info, || fli_core::provision(ctx, &request))
        }
        CommandGroupCli::Snapshot(args) => {
            let info = CommandInfo::new(CommandGroup::Snapshot, "snapshot");
            let request = SnapshotRequest { push: args.push };
            core_call(info, || fli_core::snapshot(ctx, &request))
        }
        CommandGroupCli::Config(args) => {
            let info = CommandInfo::new(CommandGroup::Config, "config");
            let request = configure_request_from_args(&args.hub);
            core_call(info, || fli_core::configure(ctx, &request))
        }
        CommandGroupCli::Info => {
            let info = CommandInfo::new(CommandGroup::Info, "info");
            core_call(info, || fli_core::store_info(ctx, &InfoRequest))
        }
        CommandGroupCli::Volumes => {
            let info = CommandInfo::new(CommandGroup::Volumes, "volumes");
            core_call(info, || fli_core::list_working_volumes(ctx, &VolumesRequest))
        }
    }
}

fn configure_request_from_args(args: &HubArgs) -> ConfigureRequest {
    ConfigureRequest {
        endpoint: args.endpoint.clone(),
        token_file: args.token_file.clone(),
    }
}

fn core_call<F>(info: CommandInfo, action: F) -> Result<(CommandInfo, fli_core::ExecutionOutcome)>
where
    F: FnOnce() -> anyhow::Result<fli_core::ExecutionOutcome>,
{
    debug!(command = %info.group, "dispatching");
    match action() {
        Ok(result) => Ok((info, result)),
        Err(err) => Ok((info, internal_error_outcome(&err))),
    }
}

fn internal_error_outcome(err: &anyhow::Error) -> fli_core::ExecutionOutcome {
    let issues: Vec<String> = err.chain().map(std::string::ToString::to_string).collect();
    fli_core::ExecutionOutcome::failure(
        err.to_string(),
        serde_json::json!({
            "reason": "internal_error",
            "code": fli_core::diag_commands::GENERIC,
            "error": err.to_string(),
            "issues": issues,
            "hint": "Re-run with `-vv` for more detail, or open an issue if this persists.",
        }),
    )
}
