// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! by the bootstrapper. Settings are read from the environment once at
//! startup; the credentials record itself lives in the `.env` file and is
//! handled by [`crate::deploy_config`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `EDITOR` | Editor opened on a freshly copied `.env` | `nano` |
//! | `HOME` | Base directory for SSH key discovery | Required for key bootstrap |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths::{DeployPaths, SshPaths};

/// Environment variable naming the operator's preferred editor.
pub const EDITOR_ENV: &str = "EDITOR";

/// Editor used when `EDITOR` is unset or empty.
pub const DEFAULT_EDITOR: &str = "nano";

/// Environment variable holding the operator's home directory.
pub const HOME_ENV: &str = "HOME";

/// Environment variable selecting the diagnostic log format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Container runtime executable.
pub const CONTAINER_RUNTIME: &str = "docker";

/// Compose orchestration executable.
pub const COMPOSE_TOOL: &str = "docker-compose";

/// Pause between `up -d` and attaching to the log stream, giving the
/// container time to emit its first lines.
pub const LOG_ATTACH_DELAY: Duration = Duration::from_secs(3);

/// A required executable together with the text shown when it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredTool {
    pub program: String,
    pub install_hint: String,
}

impl RequiredTool {
    pub fn new(program: impl Into<String>, install_hint: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            install_hint: install_hint.into(),
        }
    }
}

/// Everything the sequencer needs that is not the credentials record.
#[derive(Debug, Clone)]
pub struct BootstrapSettings {
    pub paths: DeployPaths,
    /// `None` when no home directory could be determined.
    pub ssh: Option<SshPaths>,
    pub editor: String,
    pub tools: Vec<RequiredTool>,
    pub compose_tool: String,
    pub log_attach_delay: Duration,
}

impl BootstrapSettings {
    /// Settings rooted at `project_dir` with the default toolchain.
    pub fn new(project_dir: impl Into<PathBuf>, home: Option<PathBuf>, editor: String) -> Self {
        Self {
            paths: DeployPaths::new(project_dir.into()),
            ssh: home.map(SshPaths::new),
            editor,
            tools: default_tools(),
            compose_tool: COMPOSE_TOOL.to_string(),
            log_attach_delay: LOG_ATTACH_DELAY,
        }
    }

    /// Load settings from the process environment, rooted at the current
    /// working directory.
    pub fn from_env() -> std::io::Result<Self> {
        let project_dir = env::current_dir()?;
        let home = env::var_os(HOME_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Ok(Self::new(project_dir, home, editor_from(env::var(EDITOR_ENV).ok())))
    }
}

/// Resolve the editor command, falling back to [`DEFAULT_EDITOR`].
pub fn editor_from(value: Option<String>) -> String {
    value
        .map(|editor| editor.trim().to_string())
        .filter(|editor| !editor.is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

fn default_tools() -> Vec<RequiredTool> {
    vec![
        RequiredTool::new(
            CONTAINER_RUNTIME,
            "Install Docker: https://docs.docker.com/get-docker/",
        ),
        RequiredTool::new(
            COMPOSE_TOOL,
            "Install Docker Compose: https://docs.docker.com/compose/install/",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn editor_falls_back_when_unset_or_blank() {
        assert_eq!(editor_from(None), "nano");
        assert_eq!(editor_from(Some("   ".to_string())), "nano");
        assert_eq!(editor_from(Some("vim".to_string())), "vim");
    }

    #[test]
    fn settings_require_runtime_and_compose() {
        let settings = BootstrapSettings::new("/srv/backup", None, "nano".to_string());
        let programs: Vec<_> = settings.tools.iter().map(|t| t.program.as_str()).collect();
        assert_eq!(programs, vec!["docker", "docker-compose"]);
        assert_eq!(settings.compose_tool, "docker-compose");
        assert_eq!(settings.paths.root(), Path::new("/srv/backup"));
        assert!(settings.ssh.is_none());
    }

    #[test]
    fn home_enables_ssh_paths() {
        let settings =
            BootstrapSettings::new("/srv/backup", Some("/home/op".into()), "vi".to_string());
        let ssh = settings.ssh.expect("ssh paths");
        assert_eq!(ssh.ed25519_key(), Path::new("/home/op/.ssh/id_ed25519"));
    }
}
