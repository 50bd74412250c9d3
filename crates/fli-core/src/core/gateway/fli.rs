use std::path::PathBuf;

use tracing::{debug, error, info};

use super::info::{parse_info_field, AUTH_TOKEN_FILE_LABEL, ENDPOINT_LABEL, POOL_LABEL};
use super::{render_attributes, Attributes, GatewayError, Operation, RemoteStore};
use crate::effects::ProcessRunner;
use crate::process::RunOutput;

/// Tokens the store prints, with a zero exit status, when a reference matches
/// more than one object.
pub const AMBIGUITY_MARKERS: [&str; 2] = ["Ambigous", "Ambiguous"];

/// [`RemoteStore`] backed by the `fli` command line client.
pub struct FliCli<'a> {
    program: String,
    runner: &'a dyn ProcessRunner,
    cwd: PathBuf,
}

impl<'a> FliCli<'a> {
    pub fn new(program: impl Into<String>, runner: &'a dyn ProcessRunner, cwd: PathBuf) -> Self {
        Self {
            program: program.into(),
            runner,
            cwd,
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn invoke(&self, operation: Operation, args: Vec<String>) -> Result<String, GatewayError> {
        let command = render_command(&self.program, &args);
        debug!(%operation, %command, "invoking remote store");
        let output = self
            .runner
            .run(&self.program, &args, &self.cwd)
            .map_err(|err| {
                error!(%operation, %command, error = %err, "remote store could not be started");
                GatewayError::Launch {
                    operation,
                    command: command.clone(),
                    reason: format!("{err:#}"),
                }
            })?;
        debug!(
            %operation,
            code = output.code,
            stdout = %output.stdout.trim_end(),
            stderr = %output.stderr.trim_end(),
            "remote store output"
        );
        if !output.success() {
            error!(%operation, %command, code = output.code, output = %output.combined(), "remote store command failed");
            return Err(GatewayError::CommandFailed {
                operation,
                command,
                code: output.code,
                output: output.combined(),
            });
        }
        if operation.resolves_references() && is_ambiguous(&output) {
            error!(%operation, %command, output = %output.combined(), "remote store reported an ambiguous match");
            return Err(GatewayError::AmbiguousReference {
                operation,
                command,
                output: output.combined(),
            });
        }
        Ok(output.stdout)
    }

    fn info_field(&self, label: &str) -> Result<Option<String>, GatewayError> {
        let output = self.invoke(Operation::Info, vec!["info".to_string()])?;
        let value = parse_info_field(&output, label);
        debug!(label, value = ?value, "parsed store info");
        Ok(value)
    }
}

impl RemoteStore for FliCli<'_> {
    fn configure_endpoint(&self, endpoint: &str) -> Result<String, GatewayError> {
        info!(endpoint, "setting hub endpoint");
        self.invoke(
            Operation::ConfigureEndpoint,
            vec!["config".into(), "-u".into(), endpoint.into()],
        )
    }

    fn configure_auth(&self, token_file: &str) -> Result<String, GatewayError> {
        info!(token_file, "setting hub token file");
        self.invoke(
            Operation::ConfigureAuth,
            vec![
                "config".into(),
                "--offline".into(),
                "-t".into(),
                token_file.into(),
            ],
        )
    }

    fn pool_config(&self) -> Result<Option<String>, GatewayError> {
        self.info_field(POOL_LABEL)
    }

    fn endpoint(&self) -> Result<Option<String>, GatewayError> {
        self.info_field(ENDPOINT_LABEL)
    }

    fn auth_config(&self) -> Result<Option<String>, GatewayError> {
        self.info_field(AUTH_TOKEN_FILE_LABEL)
    }

    fn sync(&self, volume_set: &str) -> Result<String, GatewayError> {
        info!(volume_set, "syncing volume set");
        self.invoke(Operation::Sync, vec!["sync".into(), volume_set.into()])
    }

    fn pull(&self, volume_set: &str, reference: Option<&str>) -> Result<String, GatewayError> {
        let target = match reference {
            Some(reference) => qualified(volume_set, reference),
            None => volume_set.to_string(),
        };
        info!(%target, "pulling");
        self.invoke(Operation::Pull, vec!["pull".into(), target])
    }

    fn clone_volume(
        &self,
        volume_set: &str,
        reference: &str,
        attributes: &Attributes,
        new_name: &str,
    ) -> Result<String, GatewayError> {
        info!(volume_set, reference, new_name, "cloning volume");
        self.invoke(
            Operation::Clone,
            vec![
                "clone".into(),
                qualified(volume_set, reference),
                "-a".into(),
                render_attributes(attributes),
                new_name.into(),
            ],
        )
    }

    fn snapshot(
        &self,
        volume_set: &str,
        volume_id: &str,
        branch: &str,
        snapshot_name: &str,
    ) -> Result<String, GatewayError> {
        info!(volume_set, volume_id, branch, snapshot_name, "creating snapshot");
        self.invoke(
            Operation::Snapshot,
            vec![
                "snapshot".into(),
                "-b".into(),
                branch.into(),
                qualified(volume_set, volume_id),
                snapshot_name.into(),
            ],
        )
    }

    fn push(&self, volume_set: &str, snapshot_id: &str) -> Result<String, GatewayError> {
        info!(volume_set, snapshot_id, "pushing snapshot");
        self.invoke(
            Operation::Push,
            vec!["push".into(), qualified(volume_set, snapshot_id)],
        )
    }
}

fn qualified(volume_set: &str, reference: &str) -> String {
    format!("{volume_set}:{reference}")
}

fn is_ambiguous(output: &RunOutput) -> bool {
    AMBIGUITY_MARKERS
        .iter()
        .any(|marker| output.stdout.contains(marker) || output.stderr.contains(marker))
}

fn render_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};

    #[derive(Default)]
    struct ScriptedRunner {
        calls: Mutex<Vec<Vec<String>>>,
        replies: Mutex<VecDeque<Result<RunOutput>>>,
    }

    impl ScriptedRunner {
        fn reply(self, code: i32, stdout: &str) -> Self {
            self.replies.lock().unwrap().push_back(Ok(RunOutput {
                code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            }));
            self
        }

        fn reply_err(self, message: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(anyhow!(message.to_string())));
            self
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[String], _cwd: &Path) -> Result<RunOutput> {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().cloned());
            self.calls.lock().unwrap().push(call);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(RunOutput {
                    code: 0,
                    stdout: String::new(),
                    stderr: String::new(),
                }))
        }
    }

    fn cli(runner: &ScriptedRunner) -> FliCli<'_> {
        FliCli::new("fli", runner, PathBuf::from("."))
    }

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn builds_argument_vectors_for_each_primitive() {
        let runner = ScriptedRunner::default();
        let store = cli(&runner);
        store.configure_endpoint("https://hub.example.com").unwrap();
        store.configure_auth("/tmp/token").unwrap();
        store.sync("app-data").unwrap();
        store.pull("app-data", Some("snap-1")).unwrap();
        store.pull("app-data", None).unwrap();
        let attrs = vec![("created_by".to_string(), "fli-docker".to_string())];
        store
            .clone_volume("app-data", "main", &attrs, "fli-1234")
            .unwrap();
        store
            .snapshot("app-data", "fli-1234", "branch-fli-1234", "fli-1234-abcd")
            .unwrap();
        store.push("app-data", "fli-1234-abcd").unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                argv(&["fli", "config", "-u", "https://hub.example.com"]),
                argv(&["fli", "config", "--offline", "-t", "/tmp/token"]),
                argv(&["fli", "sync", "app-data"]),
                argv(&["fli", "pull", "app-data:snap-1"]),
                argv(&["fli", "pull", "app-data"]),
                argv(&[
                    "fli",
                    "clone",
                    "app-data:main",
                    "-a",
                    "created_by=fli-docker",
                    "fli-1234"
                ]),
                argv(&[
                    "fli",
                    "snapshot",
                    "-b",
                    "branch-fli-1234",
                    "app-data:fli-1234",
                    "fli-1234-abcd"
                ]),
                argv(&["fli", "push", "app-data:fli-1234-abcd"]),
            ]
        );
    }

    #[test]
    fn non_zero_exit_is_a_command_failure_with_output() {
        let runner = ScriptedRunner::default().reply(3, "volume set not found");
        let err = cli(&runner).sync("missing").unwrap_err();
        match err {
            GatewayError::CommandFailed {
                operation,
                code,
                ref output,
                ref command,
            } => {
                assert_eq!(operation, Operation::Sync);
                assert_eq!(code, 3);
                assert_eq!(output, "volume set not found");
                assert_eq!(command, "fli sync missing");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn ambiguous_marker_fails_reference_operations_despite_zero_exit() {
        let runner = ScriptedRunner::default()
            .reply(0, "Ambigous match for snap-1: 2 candidates")
            .reply(0, "Ambiguous reference snap-1")
            .reply(0, "Ambigous snapshot name");
        let store = cli(&runner);
        let err = store
            .clone_volume("app-data", "snap-1", &[], "fli-1")
            .unwrap_err();
        assert_eq!(err.code(), "FLI203");
        assert_eq!(err.operation(), Operation::Clone);
        assert!(store.pull("app-data", Some("snap-1")).is_err());
        assert!(store.sync("app-data").is_err());
    }

    #[test]
    fn ambiguous_marker_is_ignored_for_push() {
        let runner = ScriptedRunner::default().reply(0, "Ambigous in a commit message");
        let out = cli(&runner).push("app-data", "snap-2").unwrap();
        assert!(out.contains("Ambigous"));
    }

    #[test]
    fn launch_failures_are_reported() {
        let runner = ScriptedRunner::default().reply_err("No such file or directory");
        let err = cli(&runner).sync("app-data").unwrap_err();
        assert_eq!(err.code(), "FLI201");
        assert_eq!(err.output(), None);
        assert!(err.to_string().contains("No such file"), "{err}");
    }

    #[test]
    fn info_getters_scrape_labelled_lines() {
        let info = "ZPOOL: chq\nFlockerHub URL: https://hub.example.com\n";
        let runner = ScriptedRunner::default()
            .reply(0, info)
            .reply(0, info)
            .reply(0, info);
        let store = cli(&runner);
        assert_eq!(store.pool_config().unwrap().as_deref(), Some("chq"));
        assert_eq!(
            store.endpoint().unwrap().as_deref(),
            Some("https://hub.example.com")
        );
        assert_eq!(store.auth_config().unwrap(), None);
        assert!(runner.calls().iter().all(|call| call == &argv(&["fli", "info"])));
    }
}
