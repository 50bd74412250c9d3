use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use super::process::{run_command, RunOutput};

pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<RunOutput>;
}

pub trait ToolLocator: Send + Sync {
    /// Resolves `program` to an executable path, or `None` when it cannot be found.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

pub trait Effects: Send + Sync {
    fn process(&self) -> &dyn ProcessRunner;
    fn tools(&self) -> &dyn ToolLocator;
}

pub type SharedEffects = Arc<dyn Effects>;

pub struct SystemEffects {
    process: Arc<SystemProcessRunner>,
    tools: Arc<SystemToolLocator>,
}

impl SystemEffects {
    #[must_use]
    pub fn new() -> Self {
        Self {
            process: Arc::new(SystemProcessRunner),
            tools: Arc::new(SystemToolLocator),
        }
    }
}

impl Default for SystemEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for SystemEffects {
    fn process(&self) -> &dyn ProcessRunner {
        self.process.as_ref()
    }

    fn tools(&self) -> &dyn ToolLocator {
        self.tools.as_ref()
    }
}

struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<RunOutput> {
        run_command(program, args, cwd)
    }
}

struct SystemToolLocator;

impl ToolLocator for SystemToolLocator {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}
