use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{Config, EnvSnapshot, GlobalOptions};
use crate::effects::{self, Effects, SharedEffects};
use crate::gateway::FliCli;
use crate::volumes::FileRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandGroup {
    Provision,
    Snapshot,
    Config,
    Info,
    Volumes,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandGroup::Provision => "provision",
            CommandGroup::Snapshot => "snapshot",
            CommandGroup::Config => "config",
            CommandGroup::Info => "info",
            CommandGroup::Volumes => "volumes",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    config: Config,
    working_dir: PathBuf,
    effects: SharedEffects,
}

impl<'a> CommandContext<'a> {
    /// Creates a command context rooted at the current working directory.
    ///
    /// # Errors
    /// Returns an error if the working directory cannot be determined.
    pub fn new(global: &'a GlobalOptions, effects: SharedEffects) -> Result<Self> {
        let working_dir = env::current_dir().context("failed to determine working directory")?;
        Ok(Self::from_parts(
            global,
            effects,
            &EnvSnapshot::capture(),
            working_dir,
        ))
    }

    pub(crate) fn from_parts(
        global: &'a GlobalOptions,
        effects: SharedEffects,
        env: &EnvSnapshot,
        working_dir: PathBuf,
    ) -> Self {
        let config = Config::from_snapshot(env, &working_dir);
        Self {
            global,
            config,
            working_dir,
            effects,
        }
    }

    pub fn effects(&self) -> &dyn Effects {
        self.effects.as_ref()
    }

    pub fn process(&self) -> &dyn effects::ProcessRunner {
        self.effects.process()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Gateway to the configured remote store executable.
    pub fn remote_store(&self) -> FliCli<'_> {
        FliCli::new(
            self.config.store().program.clone(),
            self.process(),
            self.working_dir.clone(),
        )
    }

    /// Registry file backing the working-volume records.
    pub fn registry(&self) -> FileRegistry {
        FileRegistry::new(self.config.registry().path.clone())
    }

    /// Locates the remote store executable.
    pub fn locate_store(&self) -> Option<PathBuf> {
        self.effects.tools().locate(&self.config.store().program)
    }
}
