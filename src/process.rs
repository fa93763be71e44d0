// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! External process execution.
//!
//! Every tool the bootstrapper drives (`docker`, `docker-compose`, `ssh`,
//! `ssh-keygen`, the editor) goes through [`CommandRunner`], so the
//! sequencer can be exercised against a recording fake.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

/// A program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Output of a captured (non-interactive) command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandCapture {
    /// `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandCapture {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// stdout followed by stderr, the way a terminal would show them.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Failure to run a process at all (as opposed to a non-zero exit).
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Narrow process-execution seam used by the sequencer.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Resolve `program` on the search path.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run to completion with stdout and stderr captured.
    async fn capture(&self, command: &CommandSpec) -> Result<CommandCapture, ProcessError>;

    /// Run attached to the operator's terminal, returning the exit code.
    ///
    /// Dropping the returned future must terminate the child.
    async fn attach(&self, command: &CommandSpec) -> Result<Option<i32>, ProcessError>;
}

/// [`CommandRunner`] backed by real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(spec: &CommandSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }
        command
    }
}

impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        let search_path = env::var_os("PATH")?;
        find_executable(program, env::split_paths(&search_path))
    }

    async fn capture(&self, spec: &CommandSpec) -> Result<CommandCapture, ProcessError> {
        let output = Self::command(spec)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        Ok(CommandCapture {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn attach(&self, spec: &CommandSpec) -> Result<Option<i32>, ProcessError> {
        let mut child = Self::command(spec)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| ProcessError::Wait {
            program: spec.program.clone(),
            source,
        })?;
        Ok(status.code())
    }
}

/// First directory in `dirs` holding an executable file named `program`.
pub fn find_executable<I>(program: &str, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    dirs.into_iter()
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn spec_display_joins_args() {
        let spec = CommandSpec::new("docker-compose").args(["up", "-d"]);
        assert_eq!(spec.to_string(), "docker-compose up -d");
    }

    #[test]
    fn capture_combines_streams() {
        let capture = CommandCapture {
            status: Some(1),
            stdout: "out ".to_string(),
            stderr: "err".to_string(),
        };
        assert!(!capture.success());
        assert_eq!(capture.combined(), "out err");
    }

    #[cfg(unix)]
    #[test]
    fn find_executable_skips_non_executable_files() {
        use std::os::unix::fs::PermissionsExt;

        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(first.path().join("docker"), "").unwrap();

        let bin = second.path().join("docker");
        std::fs::write(&bin, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(find_executable("docker", dirs.clone()), Some(bin));
        assert_eq!(find_executable("podman", dirs), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_captures_exit_status() {
        let runner = SystemRunner;
        let capture = runner
            .capture(&CommandSpec::new("sh").args(["-c", "echo hi; exit 3"]))
            .await
            .unwrap();
        assert_eq!(capture.status, Some(3));
        assert_eq!(capture.stdout, "hi\n");
    }

    #[tokio::test]
    async fn system_runner_reports_missing_program() {
        let err = SystemRunner
            .capture(&CommandSpec::new("definitely-not-a-real-program-xyz"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
