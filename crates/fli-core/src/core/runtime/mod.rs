//! Process execution, the effects seam, and outcome envelopes.

pub(crate) mod effects;
mod errors;
pub(crate) mod process;

pub(crate) const FLI_DOCKER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use errors::{format_status_message, to_json_response};
