use std::path::Path;

use fli_domain::ManifestError;
use serde_json::{json, Map, Value};

use crate::diagnostics::tool;
use crate::gateway::GatewayError;
use crate::outcome::ExecutionOutcome;
use crate::volumes::{CaptureError, ProvisionError, ProvisionFailure, RegistryError};

const STORE_BIN_HINT: &str = "install the fli client or point FLI_BIN at it";

pub(crate) fn missing_store_outcome(program: &str) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        format!("remote store executable `{program}` not found"),
        json!({
            "reason": "missing_tool",
            "code": tool::MISSING_BINARY,
            "program": program,
            "hint": STORE_BIN_HINT,
        }),
    )
}

pub(crate) fn manifest_error_outcome(path: &Path, err: &ManifestError) -> ExecutionOutcome {
    let (reason, hint) = match err {
        ManifestError::Read { .. } => (
            "missing_manifest",
            "pass the manifest with -f or create manifest.yml in the working directory",
        ),
        ManifestError::Parse { .. } => ("invalid_manifest", "fix the YAML syntax and rerun"),
        _ => (
            "invalid_manifest",
            "every volume needs a unique name, a volumeset and a snapshot or branch",
        ),
    };
    ExecutionOutcome::user_error(
        err.to_string(),
        json!({
            "reason": reason,
            "code": err.code(),
            "manifest": path.display().to_string(),
            "hint": hint,
        }),
    )
}

fn gateway_hint(err: &GatewayError) -> &'static str {
    match err {
        GatewayError::Launch { .. } => STORE_BIN_HINT,
        GatewayError::CommandFailed { .. } => "see the store output for the cause",
        GatewayError::AmbiguousReference { .. } => {
            "use a snapshot id or branch name that matches exactly one object"
        }
    }
}

fn gateway_details(err: &GatewayError) -> Map<String, Value> {
    let mut details = Map::new();
    details.insert("reason".into(), json!(err.reason()));
    details.insert("code".into(), json!(err.code()));
    details.insert("operation".into(), json!(err.operation().to_string()));
    details.insert("command".into(), json!(err.command()));
    if let Some(output) = err.output() {
        details.insert("output".into(), json!(output));
    }
    details.insert("hint".into(), json!(gateway_hint(err)));
    details
}

pub(crate) fn gateway_error_outcome(err: &GatewayError) -> ExecutionOutcome {
    ExecutionOutcome::failure(err.to_string(), Value::Object(gateway_details(err)))
}

fn registry_hint(err: &RegistryError) -> &'static str {
    match err {
        RegistryError::Missing { .. } => "run `fli-docker provision` to create working volumes first",
        RegistryError::Malformed { .. } => {
            "the registry was edited by hand; rerun `fli-docker provision` to rewrite it"
        }
        RegistryError::ReservedCharacter { .. } => {
            "volume and volume set names must not contain commas or line breaks"
        }
        RegistryError::Read { .. } | RegistryError::Write { .. } => {
            "check permissions on the working directory"
        }
    }
}

pub(crate) fn registry_error_outcome(err: &RegistryError) -> ExecutionOutcome {
    let details = json!({
        "reason": err.reason(),
        "code": err.code(),
        "hint": registry_hint(err),
    });
    if err.is_user_error() {
        ExecutionOutcome::user_error(err.to_string(), details)
    } else {
        ExecutionOutcome::failure(err.to_string(), details)
    }
}

pub(crate) fn provision_failure_outcome(failure: &ProvisionFailure) -> ExecutionOutcome {
    let mut details = match &failure.error {
        ProvisionError::Gateway { volume, source } => {
            let mut details = gateway_details(source);
            details.insert("volume".into(), json!(volume));
            details
        }
        ProvisionError::EmptyVolumePath {
            volume, output, ..
        } => {
            let mut details = Map::new();
            details.insert("volume".into(), json!(volume));
            details.insert("output".into(), json!(output));
            details.insert(
                "hint".into(),
                json!("the store reported success without a mount path; check the fli client"),
            );
            details
        }
        ProvisionError::Reference(_) => {
            let mut details = Map::new();
            details.insert(
                "hint".into(),
                json!("set `snapshot` or `branch` on every manifest volume"),
            );
            details
        }
        ProvisionError::Registry(err) => {
            let mut details = Map::new();
            details.insert("hint".into(), json!(registry_hint(err)));
            details
        }
    };
    details.insert("reason".into(), json!(failure.error.reason()));
    details.insert("code".into(), json!(failure.error.code()));
    if !failure.orphaned.is_empty() {
        details.insert("orphaned_volumes".into(), json!(failure.orphaned));
    }

    let message = failure.error.to_string();
    if failure.error.is_user_error() {
        ExecutionOutcome::user_error(message, Value::Object(details))
    } else {
        ExecutionOutcome::failure(message, Value::Object(details))
    }
}

pub(crate) fn capture_error_outcome(err: &CaptureError) -> ExecutionOutcome {
    match err {
        CaptureError::Registry(inner) => registry_error_outcome(inner),
        CaptureError::Stage {
            stage,
            volume_name,
            volume_set,
            source,
        } => {
            let mut details = gateway_details(source);
            details.insert("stage".into(), json!(stage));
            details.insert("volume_name".into(), json!(volume_name));
            details.insert("volume_set".into(), json!(volume_set));
            ExecutionOutcome::failure(err.to_string(), Value::Object(details))
        }
    }
}
