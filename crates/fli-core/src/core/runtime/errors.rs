use serde_json::{json, Value};

use crate::context::CommandInfo;
use crate::outcome::{CommandStatus, ExecutionOutcome};

use super::FLI_DOCKER_VERSION;

#[must_use]
pub fn to_json_response(info: CommandInfo, outcome: &ExecutionOutcome, code: i32) -> Value {
    let status = match outcome.status {
        CommandStatus::Ok => "ok",
        CommandStatus::UserError => "user-error",
        CommandStatus::Failure => "error",
    };
    let details = match &outcome.details {
        Value::Object(_) => outcome.details.clone(),
        Value::Null => json!({}),
        other => json!({ "value": other }),
    };
    json!({
        "status": status,
        "exit_code": code,
        "message": format_status_message(info, &outcome.message),
        "details": details,
        "version": FLI_DOCKER_VERSION,
    })
}

#[must_use]
pub fn format_status_message(info: CommandInfo, message: &str) -> String {
    let prefix = format!("fli-docker {}", info.name);
    if message.is_empty() {
        prefix
    } else if message.starts_with(&prefix) {
        message.to_string()
    } else {
        format!("{prefix}: {message}")
    }
}
