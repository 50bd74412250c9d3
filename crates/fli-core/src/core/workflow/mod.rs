//! Command handlers behind the `fli-docker` subcommands.
//!
//! Each handler takes a [`CommandContext`](crate::context::CommandContext)
//! and a request, and reports through an
//! [`ExecutionOutcome`](crate::outcome::ExecutionOutcome). Expected failures
//! become user-error or failure outcomes; only unexpected errors escape as
//! `anyhow::Error`.

mod hub;
mod listing;
mod provision;
mod snapshot;

pub use hub::{configure, configure_hub, store_info, ConfigureRequest, InfoRequest};
pub use listing::{list_working_volumes, VolumesRequest};
pub use provision::{provision, ProvisionRequest};
pub use snapshot::{snapshot, SnapshotRequest};

use tracing::debug;

use crate::context::CommandContext;
use crate::outcome::ExecutionOutcome;
use crate::tooling::missing_store_outcome;

/// Outcome to report when the remote store executable cannot be found.
fn missing_store(ctx: &CommandContext) -> Option<ExecutionOutcome> {
    let program = &ctx.config().store().program;
    match ctx.locate_store() {
        Some(path) => {
            debug!(program, path = %path.display(), "located remote store");
            None
        }
        None => Some(missing_store_outcome(program)),
    }
}
