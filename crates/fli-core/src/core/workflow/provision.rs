use std::path::PathBuf;

use anyhow::Result;
use fli_domain::{volume_mounts, HubSettings, Manifest};
use serde_json::json;
use tracing::info;

use super::{configure_hub, missing_store};
use crate::context::CommandContext;
use crate::outcome::ExecutionOutcome;
use crate::tooling::{gateway_error_outcome, manifest_error_outcome, provision_failure_outcome};
use crate::volumes::{provision_volumes, UuidNames, VolumeContext};

#[derive(Clone, Debug, Default)]
pub struct ProvisionRequest {
    /// Manifest path; relative paths resolve against the working directory.
    pub manifest: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub token_file: Option<String>,
}

impl ProvisionRequest {
    /// Hub settings from the request, falling back to the manifest's.
    fn hub_settings(&self, manifest: &HubSettings) -> HubSettings {
        HubSettings {
            endpoint: self
                .endpoint
                .clone()
                .or_else(|| manifest.endpoint.clone()),
            token_file: self
                .token_file
                .clone()
                .or_else(|| manifest.token_file.clone()),
        }
    }
}

/// Provisions the manifest's volumes and records them as working volumes.
///
/// # Errors
/// Returns an error only for failures outside manifest loading, store
/// invocations and registry writes, which are reported as outcomes.
pub fn provision(ctx: &CommandContext, request: &ProvisionRequest) -> Result<ExecutionOutcome> {
    let manifest_path = match &request.manifest {
        Some(path) => ctx.working_dir().join(path),
        None => ctx.config().manifest().default_path.clone(),
    };
    let manifest = match Manifest::load(&manifest_path) {
        Ok(manifest) => manifest,
        Err(err) => return Ok(manifest_error_outcome(&manifest_path, &err)),
    };
    if let Some(outcome) = missing_store(ctx) {
        return Ok(outcome);
    }

    let store = ctx.remote_store();
    if let Err(err) = configure_hub(&store, &request.hub_settings(&manifest.flocker_hub)) {
        return Ok(gateway_error_outcome(&err));
    }

    let registry = ctx.registry();
    let names = UuidNames;
    let volumes = VolumeContext::new(&store, &registry, &names);
    let provisioned = match provision_volumes(&volumes, &manifest.volumes) {
        Ok(provisioned) => provisioned,
        Err(failure) => return Ok(provision_failure_outcome(&failure)),
    };
    info!(
        manifest = %manifest_path.display(),
        volumes = provisioned.len(),
        "provisioning complete"
    );

    let mounts = volume_mounts(&provisioned);
    let mut message = format!("provisioned {} volume(s)", provisioned.len());
    for (name, path) in &mounts {
        message.push_str(&format!("\n  {name} -> {path}"));
    }
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "manifest": manifest_path.display().to_string(),
            "docker_app": manifest.docker_app,
            "volumes": provisioned,
            "mounts": mounts,
            "registry": registry.path().display().to_string(),
        }),
    ))
}
