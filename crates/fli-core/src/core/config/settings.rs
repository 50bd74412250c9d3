use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use fli_domain::DEFAULT_MANIFEST;
use serde::{Deserialize, Serialize};

pub(crate) const STORE_BIN_ENV: &str = "FLI_BIN";
pub(crate) const REGISTRY_ENV: &str = "FLI_DOCKER_REGISTRY";
pub(crate) const MANIFEST_ENV: &str = "FLI_DOCKER_MANIFEST";

pub const DEFAULT_STORE_BIN: &str = "fli";
pub const DEFAULT_REGISTRY_FILE: &str = ".flidockervols";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value of `key` with surrounding whitespace removed; blank counts as unset.
    pub(crate) fn non_empty(&self, key: &str) -> Option<&str> {
        self.var(key).map(str::trim).filter(|value| !value.is_empty())
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug)]
pub struct Config {
    pub(crate) store: StoreConfig,
    pub(crate) registry: RegistryConfig,
    pub(crate) manifest: ManifestConfig,
}

impl Config {
    /// Builds a configuration snapshot from the current process environment.
    #[must_use]
    pub fn from_env(working_dir: &Path) -> Self {
        let snapshot = EnvSnapshot::capture();
        Self::from_snapshot(&snapshot, working_dir)
    }

    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot, working_dir: &Path) -> Self {
        let registry = snapshot
            .non_empty(REGISTRY_ENV)
            .unwrap_or(DEFAULT_REGISTRY_FILE);
        let manifest = snapshot.non_empty(MANIFEST_ENV).unwrap_or(DEFAULT_MANIFEST);
        Self {
            store: StoreConfig {
                program: snapshot
                    .non_empty(STORE_BIN_ENV)
                    .unwrap_or(DEFAULT_STORE_BIN)
                    .to_string(),
            },
            registry: RegistryConfig {
                path: working_dir.join(registry),
            },
            manifest: ManifestConfig {
                default_path: working_dir.join(manifest),
            },
        }
    }

    #[must_use]
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    #[must_use]
    pub fn registry(&self) -> &RegistryConfig {
        &self.registry
    }

    #[must_use]
    pub fn manifest(&self) -> &ManifestConfig {
        &self.manifest
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Remote store executable, looked up on `PATH` when not absolute.
    pub program: String,
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ManifestConfig {
    pub default_path: PathBuf,
}
