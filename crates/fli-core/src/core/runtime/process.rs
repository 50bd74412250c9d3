#![deny(clippy::all, warnings)]

use std::{
    io::Read,
    path::Path,
    process::{Command, Stdio},
    thread,
};

use anyhow::{Context, Result};

pub(crate) const MAX_CAPTURE_ENV: &str = "FLI_DOCKER_MAX_CAPTURE_BYTES";
const DEFAULT_MAX_CAPTURE_BYTES: usize = 1024 * 1024;

fn max_capture_bytes() -> usize {
    std::env::var(MAX_CAPTURE_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_CAPTURE_BYTES)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Stdout followed by stderr, for diagnostics.
    #[must_use]
    pub fn combined(&self) -> String {
        match (self.stdout.trim_end(), self.stderr.trim_end()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{out}\n{err}"),
        }
    }
}

/// Execute a program to completion and capture stdout/stderr.
///
/// Stdin is closed. Output beyond the capture limit keeps its tail and gains
/// a truncation marker.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned or the I/O streams cannot
/// be read entirely.
pub fn run_command(program: &str, args: &[String], cwd: &Path) -> Result<RunOutput> {
    let mut command = Command::new(program);
    command.args(args);
    command.current_dir(cwd);
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .with_context(|| format!("failed to start {program}"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("stdout missing for {program}"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow::anyhow!("stderr missing for {program}"))?;
    let limit = max_capture_bytes();
    let stdout_handle = thread::spawn(move || read_to_string_limited(stdout, limit));
    let stderr_handle = thread::spawn(move || read_to_string_limited(stderr, limit));

    let status = child
        .wait()
        .with_context(|| format!("failed to wait for {program}"))?;
    let code = status.code().unwrap_or(-1);
    let (mut stdout, stdout_truncated) = stdout_handle
        .join()
        .map_err(|_| anyhow::anyhow!("stdout thread panicked"))??;
    let (mut stderr, stderr_truncated) = stderr_handle
        .join()
        .map_err(|_| anyhow::anyhow!("stderr thread panicked"))??;
    if stdout_truncated {
        stdout.push_str("\n[...truncated...]\n");
    }
    if stderr_truncated {
        stderr.push_str("\n[...truncated...]\n");
    }
    Ok(RunOutput {
        code,
        stdout,
        stderr,
    })
}

fn read_to_string_limited(mut reader: impl Read, limit: usize) -> Result<(String, bool)> {
    let mut buffer = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; 8192];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        append_limited(&mut buffer, &chunk[..read], limit, &mut truncated);
    }
    Ok((String::from_utf8_lossy(&buffer).to_string(), truncated))
}

fn append_limited(buffer: &mut Vec<u8>, chunk: &[u8], limit: usize, truncated: &mut bool) {
    if buffer.len().saturating_add(chunk.len()) <= limit {
        buffer.extend_from_slice(chunk);
        return;
    }
    *truncated = true;
    let old_len = buffer.len();
    let excess = old_len.saturating_add(chunk.len()).saturating_sub(limit);
    if excess >= old_len {
        buffer.clear();
        let drop_from_chunk = excess.saturating_sub(old_len).min(chunk.len());
        buffer.extend_from_slice(&chunk[drop_from_chunk..]);
    } else {
        buffer.drain(0..excess);
        buffer.extend_from_slice(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::Path;

    use serial_test::serial;

    #[cfg(unix)]
    #[test]
    fn run_command_captures_output_and_status_unix() -> Result<()> {
        let output = run_command(
            "/bin/sh",
            &[
                "-c".to_string(),
                "printf out && printf err >&2; exit 7".to_string(),
            ],
            Path::new("."),
        )?;
        assert_eq!(output.code, 7);
        assert!(!output.success());
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
        assert_eq!(output.combined(), "out\nerr");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn run_command_passes_arguments_without_a_shell() -> Result<()> {
        let output = run_command(
            "/bin/echo",
            &["app-data:snap 1".to_string(), "$HOME".to_string()],
            Path::new("."),
        )?;
        assert!(output.success());
        assert_eq!(output.stdout.trim_end(), "app-data:snap 1 $HOME");
        Ok(())
    }

    #[test]
    fn run_command_reports_missing_program() {
        let err = run_command("fli-docker-definitely-missing", &[], Path::new("."))
            .expect_err("spawn should fail");
        assert!(err.to_string().contains("failed to start"), "{err}");
    }

    #[test]
    fn append_limited_keeps_the_tail() {
        let mut buffer = Vec::new();
        let mut truncated = false;
        append_limited(&mut buffer, b"abcdef", 4, &mut truncated);
        assert!(truncated);
        assert_eq!(buffer, b"cdef");

        append_limited(&mut buffer, b"gh", 4, &mut truncated);
        assert_eq!(buffer, b"efgh");
    }

    #[test]
    fn combined_skips_empty_streams() {
        let output = RunOutput {
            code: 0,
            stdout: String::new(),
            stderr: "warning\n".into(),
        };
        assert_eq!(output.combined(), "warning");
    }

    #[test]
    #[serial]
    fn capture_limit_comes_from_environment() {
        env::set_var(MAX_CAPTURE_ENV, "16");
        assert_eq!(max_capture_bytes(), 16);
        env::set_var(MAX_CAPTURE_ENV, "0");
        assert_eq!(max_capture_bytes(), DEFAULT_MAX_CAPTURE_BYTES);
        env::remove_var(MAX_CAPTURE_ENV);
        assert_eq!(max_capture_bytes(), DEFAULT_MAX_CAPTURE_BYTES);
    }
}
