use fli_domain::{
    resolve_all, ProvisionedVolume, ReferenceError, VolumeRef, VolumeSpec, WorkingVolumeRecord,
};
use tracing::{error, info, warn};

use super::naming::provenance_attributes;
use super::registry::{checked_field, RegistryError};
use super::VolumeContext;
use crate::gateway::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error("volume '{volume}': {source}")]
    Gateway {
        volume: String,
        #[source]
        source: GatewayError,
    },
    #[error("[FLI402] clone of {volume_set}:{reference} for volume '{volume}' reported no volume path")]
    EmptyVolumePath {
        volume: String,
        volume_set: String,
        reference: String,
        output: String,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ProvisionError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Reference(err) => err.code(),
            Self::Gateway { source, .. } => source.code(),
            Self::EmptyVolumePath { .. } => "FLI402",
            Self::Registry(err) => err.code(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Reference(_) => "unspecified_reference",
            Self::Gateway { source, .. } => source.reason(),
            Self::EmptyVolumePath { .. } => "empty_volume_path",
            Self::Registry(err) => err.reason(),
        }
    }

    /// Problems in the manifest the operator can fix, as opposed to store or
    /// filesystem failures.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Reference(_) | Self::Registry(RegistryError::ReservedCharacter { .. })
        )
    }
}

/// A provisioning run that stopped early.
///
/// Clones made before the failure stay at the remote store and are not
/// recorded in the registry; `orphaned` lists them for cleanup.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ProvisionFailure {
    #[source]
    pub error: ProvisionError,
    pub orphaned: Vec<ProvisionedVolume>,
}

impl ProvisionFailure {
    fn new(error: impl Into<ProvisionError>, orphaned: Vec<ProvisionedVolume>) -> Self {
        let error = error.into();
        if !orphaned.is_empty() {
            let names: Vec<&str> = orphaned.iter().map(|v| v.volume_name.as_str()).collect();
            warn!(orphaned = ?names, "provisioning stopped; clones left unregistered");
        }
        Self { error, orphaned }
    }
}

/// Provisions every spec in manifest order, then replaces the registry with
/// the new clones.
///
/// All references are resolved, and every volume set checked against the
/// registry format, before the store is touched. Each volume is
/// synced, pulled, and cloned in turn; the first failure stops the run and
/// leaves the registry as it was.
pub fn provision_volumes(
    ctx: &VolumeContext<'_>,
    specs: &[VolumeSpec],
) -> Result<Vec<ProvisionedVolume>, ProvisionFailure> {
    let references = resolve_all(specs).map_err(|err| ProvisionFailure::new(err, Vec::new()))?;
    for spec in specs {
        checked_field("volume set", &spec.volume_set)
            .map_err(|err| ProvisionFailure::new(err, Vec::new()))?;
    }

    let mut provisioned = Vec::with_capacity(specs.len());
    for (spec, reference) in specs.iter().zip(&references) {
        match provision_one(ctx, spec, reference) {
            Ok(volume) => provisioned.push(volume),
            Err(err) => {
                error!(volume = %spec.name, error = %err, "provisioning failed");
                return Err(ProvisionFailure::new(err, provisioned));
            }
        }
    }

    let records: Vec<WorkingVolumeRecord> =
        provisioned.iter().map(WorkingVolumeRecord::from).collect();
    if let Err(err) = ctx.registry().write(&records) {
        return Err(ProvisionFailure::new(err, provisioned));
    }
    info!(
        volumes = provisioned.len(),
        registry = %ctx.registry().location(),
        "provisioned working volumes"
    );
    Ok(provisioned)
}

fn provision_one(
    ctx: &VolumeContext<'_>,
    spec: &VolumeSpec,
    reference: &VolumeRef,
) -> Result<ProvisionedVolume, ProvisionError> {
    let store = ctx.store();
    let gateway = |source| ProvisionError::Gateway {
        volume: spec.name.clone(),
        source,
    };

    store.sync(&spec.volume_set).map_err(gateway)?;
    store
        .pull(&spec.volume_set, reference.pull_ref())
        .map_err(gateway)?;

    info!(volume = %spec.name, from = %reference, "creating volume");
    let new_name = ctx.names().volume_name();
    let attributes = provenance_attributes(reference.clone_ref());
    let output = store
        .clone_volume(
            &spec.volume_set,
            reference.clone_ref(),
            &attributes,
            &new_name,
        )
        .map_err(gateway)?;

    let path = output.trim();
    if path.is_empty() {
        return Err(ProvisionError::EmptyVolumePath {
            volume: spec.name.clone(),
            volume_set: spec.volume_set.clone(),
            reference: reference.clone_ref().to_string(),
            output,
        });
    }
    info!(volume = %spec.name, clone = %new_name, path, "volume ready");
    Ok(ProvisionedVolume {
        name: spec.name.clone(),
        volume_path: path.to_string(),
        volume_name: new_name,
        volume_set: spec.volume_set.clone(),
    })
}
