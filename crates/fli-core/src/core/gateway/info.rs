use serde::Serialize;

pub const POOL_LABEL: &str = "ZPOOL:";
pub const ENDPOINT_LABEL: &str = "FlockerHub URL:";
pub const AUTH_TOKEN_FILE_LABEL: &str = "Auth Token File:";

/// Settings reported by the store's `info` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreInfo {
    pub pool: Option<String>,
    pub endpoint: Option<String>,
    pub auth_token_file: Option<String>,
}

/// Returns the first whitespace-delimited value following `label` in `info`
/// output, if any line carries it.
#[must_use]
pub fn parse_info_field(output: &str, label: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let start = line.find(label)? + label.len();
        line[start..].split_whitespace().next().map(str::to_string)
    })
}
