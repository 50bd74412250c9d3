#![deny(clippy::all, warnings)]

mod core;

pub mod api;

pub mod gateway {
    pub use crate::core::gateway::*;
}

pub mod volumes {
    pub use crate::core::volumes::*;
}

pub(crate) use crate::core::config;
pub(crate) use crate::core::config::context;
pub(crate) use crate::core::runtime::{effects, process};
pub(crate) use crate::core::tooling;
pub(crate) use crate::core::tooling::{diagnostics, outcome};

pub use crate::core::config::context::{CommandContext, CommandGroup, CommandInfo};
pub use crate::core::config::{
    Config, GlobalOptions, ManifestConfig, RegistryConfig, StoreConfig, DEFAULT_REGISTRY_FILE,
    DEFAULT_STORE_BIN,
};
pub use crate::core::runtime::effects::{
    Effects, ProcessRunner, SharedEffects, SystemEffects, ToolLocator,
};
pub use crate::core::runtime::process::{run_command, RunOutput};
pub use crate::core::runtime::{format_status_message, to_json_response};
pub use crate::core::tooling::diagnostics::commands as diag_commands;
pub use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome};
pub use crate::core::workflow::{
    configure, configure_hub, list_working_volumes, provision, snapshot, store_info,
    ConfigureRequest, InfoRequest, ProvisionRequest, SnapshotRequest, VolumesRequest,
};
