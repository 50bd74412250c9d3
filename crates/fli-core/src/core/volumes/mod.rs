//! Volume lifecycle: provisioning clones from remote references, recording
//! them, and capturing them back into snapshots.

mod capture;
mod naming;
mod provision;
mod registry;

pub use capture::{
    capture_working_volumes, snapshot_and_push_working_volumes, snapshot_working_volumes,
    CaptureError, CaptureMode, CaptureStage, CapturedSnapshot,
};
pub use naming::{
    lineage_branch, provenance_attributes, NameSource, UuidNames, CLONE_PREFIX, CREATED_BY,
};
pub use provision::{provision_volumes, ProvisionError, ProvisionFailure};
pub use registry::{
    parse_records, render_records, FileRegistry, MemoryRegistry, RegistryError, VolumeRegistry,
};

use crate::gateway::RemoteStore;

/// Collaborators threaded through provisioning and capture.
#[derive(Clone, Copy)]
pub struct VolumeContext<'a> {
    store: &'a dyn RemoteStore,
    registry: &'a dyn VolumeRegistry,
    names: &'a dyn NameSource,
}

impl<'a> VolumeContext<'a> {
    pub fn new(
        store: &'a dyn RemoteStore,
        registry: &'a dyn VolumeRegistry,
        names: &'a dyn NameSource,
    ) -> Self {
        Self {
            store,
            registry,
            names,
        }
    }

    pub fn store(&self) -> &'a dyn RemoteStore {
        self.store
    }

    pub fn registry(&self) -> &'a dyn VolumeRegistry {
        self.registry
    }

    pub fn names(&self) -> &'a dyn NameSource {
        self.names
    }
}
