//! Remote dataset store command surface.
//!
//! Every primitive the volume pipelines need is one method on [`RemoteStore`].
//! [`FliCli`] drives the `fli` executable; tests substitute recording fakes.

mod fli;
mod info;

use std::fmt;

pub use fli::{FliCli, AMBIGUITY_MARKERS};
pub use info::{parse_info_field, StoreInfo, AUTH_TOKEN_FILE_LABEL, ENDPOINT_LABEL, POOL_LABEL};

/// Primitive operations of the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ConfigureEndpoint,
    ConfigureAuth,
    Info,
    Sync,
    Pull,
    Clone,
    Snapshot,
    Push,
}

impl Operation {
    /// Whether a zero-exit result must also be checked for an ambiguous match.
    #[must_use]
    pub fn resolves_references(self) -> bool {
        matches!(self, Self::Sync | Self::Pull | Self::Clone)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConfigureEndpoint => "configure endpoint",
            Self::ConfigureAuth => "configure auth token file",
            Self::Info => "query info",
            Self::Sync => "sync",
            Self::Pull => "pull",
            Self::Clone => "clone",
            Self::Snapshot => "snapshot",
            Self::Push => "push",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("[FLI201] could not run `{command}`: {reason}")]
    Launch {
        operation: Operation,
        command: String,
        reason: String,
    },
    #[error("[FLI202] {operation} failed: `{command}` exited with status {code}")]
    CommandFailed {
        operation: Operation,
        command: String,
        code: i32,
        output: String,
    },
    #[error("[FLI203] {operation} found an ambiguous match: `{command}`")]
    AmbiguousReference {
        operation: Operation,
        command: String,
        output: String,
    },
}

impl GatewayError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Launch { .. } => "FLI201",
            Self::CommandFailed { .. } => "FLI202",
            Self::AmbiguousReference { .. } => "FLI203",
        }
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Launch { .. } => "store_unavailable",
            Self::CommandFailed { .. } => "store_command_failed",
            Self::AmbiguousReference { .. } => "ambiguous_reference",
        }
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Launch { operation, .. }
            | Self::CommandFailed { operation, .. }
            | Self::AmbiguousReference { operation, .. } => *operation,
        }
    }

    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Launch { command, .. }
            | Self::CommandFailed { command, .. }
            | Self::AmbiguousReference { command, .. } => command,
        }
    }

    /// Raw store output captured for the failing invocation.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Launch { .. } => None,
            Self::CommandFailed { output, .. } | Self::AmbiguousReference { output, .. } => {
                Some(output)
            }
        }
    }
}

/// `key=value` attributes attached to a clone.
pub type Attributes = [(String, String)];

pub trait RemoteStore {
    /// Points the store at a hub endpoint.
    fn configure_endpoint(&self, endpoint: &str) -> Result<String, GatewayError>;
    /// Configures the offline auth token file.
    fn configure_auth(&self, token_file: &str) -> Result<String, GatewayError>;
    fn pool_config(&self) -> Result<Option<String>, GatewayError>;
    fn endpoint(&self) -> Result<Option<String>, GatewayError>;
    fn auth_config(&self) -> Result<Option<String>, GatewayError>;
    fn sync(&self, volume_set: &str) -> Result<String, GatewayError>;
    /// Pulls one reference, or the whole volume set when `reference` is `None`.
    fn pull(&self, volume_set: &str, reference: Option<&str>) -> Result<String, GatewayError>;
    /// Clones `volume_set:reference` into a new volume and returns the raw
    /// output, which carries the mount path.
    fn clone_volume(
        &self,
        volume_set: &str,
        reference: &str,
        attributes: &Attributes,
        new_name: &str,
    ) -> Result<String, GatewayError>;
    fn snapshot(
        &self,
        volume_set: &str,
        volume_id: &str,
        branch: &str,
        snapshot_name: &str,
    ) -> Result<String, GatewayError>;
    fn push(&self, volume_set: &str, snapshot_id: &str) -> Result<String, GatewayError>;
}

#[must_use]
pub fn render_attributes(attributes: &Attributes) -> String {
    attributes
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}
