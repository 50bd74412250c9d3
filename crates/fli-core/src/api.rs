// Intended public API surface for `fli-core`.
//
// Keeps the crate root small and spells out which types and functions the
// CLI and embedding callers rely on.

pub use crate::core::config::context::{CommandContext, CommandGroup, CommandInfo};
pub use crate::core::config::{Config, GlobalOptions};
pub use crate::core::gateway::{FliCli, GatewayError, Operation, RemoteStore, StoreInfo};
pub use crate::core::runtime::effects::{SharedEffects, SystemEffects};
pub use crate::core::runtime::process::RunOutput;
pub use crate::core::runtime::{format_status_message, to_json_response};
pub use crate::core::tooling::diagnostics::commands as diag_commands;
pub use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome};
pub use crate::core::volumes::{
    capture_working_volumes, provision_volumes, snapshot_and_push_working_volumes,
    snapshot_working_volumes, CaptureError, CaptureMode, CapturedSnapshot, FileRegistry,
    MemoryRegistry, ProvisionError, ProvisionFailure, RegistryError, UuidNames, VolumeContext,
    VolumeRegistry,
};
pub use crate::core::workflow::{
    configure, list_working_volumes, provision, snapshot, store_info, ConfigureRequest,
    InfoRequest, ProvisionRequest, SnapshotRequest, VolumesRequest,
};
pub use fli_domain::{Manifest, ProvisionedVolume, VolumeSpec, WorkingVolumeRecord};
