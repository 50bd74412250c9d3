use anyhow::Result;
use fli_domain::HubSettings;
use serde_json::json;
use tracing::info;

use super::missing_store;
use crate::context::CommandContext;
use crate::gateway::{GatewayError, RemoteStore, StoreInfo};
use crate::outcome::ExecutionOutcome;
use crate::tooling::gateway_error_outcome;

#[derive(Clone, Debug, Default)]
pub struct ConfigureRequest {
    pub endpoint: Option<String>,
    pub token_file: Option<String>,
}

pub struct InfoRequest;

/// Applies whichever hub settings are present, endpoint first.
///
/// Returns the names of the settings that were applied.
///
/// # Errors
/// Returns the first failing `config` invocation.
pub fn configure_hub(
    store: &dyn RemoteStore,
    hub: &HubSettings,
) -> Result<Vec<&'static str>, GatewayError> {
    let mut applied = Vec::new();
    if let Some(endpoint) = hub.endpoint.as_deref() {
        store.configure_endpoint(endpoint)?;
        applied.push("endpoint");
    }
    if let Some(token_file) = hub.token_file.as_deref() {
        store.configure_auth(token_file)?;
        applied.push("token_file");
    }
    if !applied.is_empty() {
        info!(settings = ?applied, "configured hub");
    }
    Ok(applied)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn or_unset(value: Option<&str>) -> &str {
    value.unwrap_or("(not set)")
}

/// Points the remote store at a hub.
///
/// # Errors
/// Returns an error only for failures outside the store invocation itself.
pub fn configure(ctx: &CommandContext, request: &ConfigureRequest) -> Result<ExecutionOutcome> {
    let hub = HubSettings {
        endpoint: non_blank(request.endpoint.as_deref()),
        token_file: non_blank(request.token_file.as_deref()),
    };
    if hub.endpoint.is_none() && hub.token_file.is_none() {
        return Ok(ExecutionOutcome::user_error(
            "nothing to configure",
            json!({
                "reason": "missing_settings",
                "hint": "pass --endpoint, --token-file, or both",
            }),
        ));
    }
    if let Some(outcome) = missing_store(ctx) {
        return Ok(outcome);
    }
    let store = ctx.remote_store();
    match configure_hub(&store, &hub) {
        Ok(applied) => Ok(ExecutionOutcome::success(
            format!("configured {}", applied.join(" and ").replace('_', " ")),
            json!({
                "endpoint": hub.endpoint,
                "token_file": hub.token_file,
            }),
        )),
        Err(err) => Ok(gateway_error_outcome(&err)),
    }
}

fn query_info(store: &dyn RemoteStore) -> Result<StoreInfo, GatewayError> {
    Ok(StoreInfo {
        pool: store.pool_config()?,
        endpoint: store.endpoint()?,
        auth_token_file: store.auth_config()?,
    })
}

/// Reports the pool, hub endpoint and token file the store is using.
///
/// # Errors
/// Returns an error only for failures outside the store invocation itself.
pub fn store_info(ctx: &CommandContext, _request: &InfoRequest) -> Result<ExecutionOutcome> {
    if let Some(outcome) = missing_store(ctx) {
        return Ok(outcome);
    }
    let store = ctx.remote_store();
    let info = match query_info(&store) {
        Ok(info) => info,
        Err(err) => return Ok(gateway_error_outcome(&err)),
    };
    let message = format!(
        "pool: {}\nendpoint: {}\ntoken file: {}",
        or_unset(info.pool.as_deref()),
        or_unset(info.endpoint.as_deref()),
        or_unset(info.auth_token_file.as_deref()),
    );
    Ok(ExecutionOutcome::success(message, json!(info)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tempfile::tempdir;

    use crate::config::GlobalOptions;
    use crate::outcome::CommandStatus;
    use crate::core::workflow::testing::{context, FakeFli};

    #[test]
    fn configure_applies_endpoint_then_token_file() {
        let temp = tempdir().unwrap();
        let global = GlobalOptions::default();
        let fli = Arc::new(FakeFli::default());
        let ctx = context(&global, &fli, temp.path());

        let outcome = configure(
            &ctx,
            &ConfigureRequest {
                endpoint: Some("https://hub.example.com".into()),
                token_file: Some("/root/token.txt".into()),
            },
        )
        .unwrap();
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(outcome.message, "configured endpoint and token file");
        assert_eq!(
            fli.calls(),
            vec![
                "config -u https://hub.example.com",
                "config --offline -t /root/token.txt",
            ]
        );
    }

    #[test]
    fn configure_without_settings_is_a_user_error() {
        let temp = tempdir().unwrap();
        let global = GlobalOptions::default();
        let fli = Arc::new(FakeFli::default());
        let ctx = context(&global, &fli, temp.path());

        let outcome = configure(
            &ctx,
            &ConfigureRequest {
                endpoint: Some("  ".into()),
                token_file: None,
            },
        )
        .unwrap();
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert!(fli.calls().is_empty());
    }

    #[test]
    fn info_reports_absent_fields_as_null() {
        let temp = tempdir().unwrap();
        let global = GlobalOptions::default();
        let fli = Arc::new(FakeFli::default());
        fli.reply("info", 0, "ZPOOL: chq\n");
        let ctx = context(&global, &fli, temp.path());

        let outcome = store_info(&ctx, &InfoRequest).unwrap();
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(outcome.details["pool"], "chq");
        assert!(outcome.details["endpoint"].is_null());
        assert!(outcome.message.contains("token file: (not set)"));
    }

    #[test]
    fn failing_info_command_is_reported() {
        let temp = tempdir().unwrap();
        let global = GlobalOptions::default();
        let fli = Arc::new(FakeFli::default());
        fli.reply("info", 1, "");
        let ctx = context(&global, &fli, temp.path());

        let outcome = store_info(&ctx, &InfoRequest).unwrap();
        assert_eq!(outcome.status, CommandStatus::Failure);
        assert_eq!(outcome.details["code"], "FLI202");
        assert_eq!(outcome.details["operation"], "query info");
    }

    #[test]
    fn missing_store_binary_stops_before_invoking_it() {
        let temp = tempdir().unwrap();
        let global = GlobalOptions::default();
        let fli = Arc::new(FakeFli::missing());
        let ctx = context(&global, &fli, temp.path());

        let outcome = store_info(&ctx, &InfoRequest).unwrap();
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["code"], "FLI001");
        assert!(fli.calls().is_empty());
    }
}
