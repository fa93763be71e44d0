// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bootstrap failures and warnings.

use std::fmt;
use std::path::PathBuf;

use crate::deploy_config::ConfigLoadError;
use crate::validation::Violation;

/// Exit status for every fatal bootstrap failure.
pub const FAILURE_EXIT_CODE: u8 = 1;

/// A failure that stops the bootstrap sequence.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("required tool `{tool}` was not found on PATH")]
    MissingDependency { tool: String, install_hint: String },

    #[error("configuration template {} not found", path.display())]
    MissingTemplate { path: PathBuf },

    #[error("could not read configuration {}: {source}", path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: ConfigLoadError,
    },

    #[error("configuration has {} invalid field(s): {}", violations.len(), field_names(violations))]
    ConfigurationInvalid { violations: Vec<Violation> },

    #[error("image build failed: {detail}")]
    BuildFailed { detail: String },

    #[error("service start failed: {detail}")]
    StartFailed { detail: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BootstrapError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BootstrapError::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        FAILURE_EXIT_CODE
    }

    /// Follow-up text for the operator, printed after the error itself.
    pub fn operator_hint(&self) -> Option<String> {
        match self {
            BootstrapError::MissingDependency { install_hint, .. } => Some(install_hint.clone()),
            BootstrapError::MissingTemplate { .. } => Some(
                "Restore .env.example from the project repository and run again.".to_string(),
            ),
            BootstrapError::ConfigurationInvalid { violations } => {
                let mut hint = String::from("Fix the following entries in .env:");
                for violation in violations {
                    hint.push_str(&format!("\n  - {violation}"));
                }
                Some(hint)
            }
            BootstrapError::ConfigUnreadable { .. } => {
                Some("Check .env for lines that are not KEY=value.".to_string())
            }
            BootstrapError::BuildFailed { .. } | BootstrapError::StartFailed { .. } => {
                Some("Check the compose output above for details.".to_string())
            }
            BootstrapError::Io { .. } => None,
        }
    }

    /// Names of the fields that failed validation, if any.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        match self {
            BootstrapError::ConfigurationInvalid { violations } => {
                violations.iter().map(|v| v.field.key()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn field_names(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.field.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A soft failure: logged, recorded, and the sequence continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepWarning {
    /// The SSH probe did not report a successful authentication
    ConnectivityWarning(String),
    /// The editor could not be started or exited non-zero
    EditorFailed(String),
    /// No SSH key exists and none was generated
    KeyGenerationSkipped,
    /// `ssh-keygen` failed or its public key could not be read
    KeyGenerationFailed(String),
    /// An optional `.env` setting the service will read differently than written
    SettingIgnored(String),
}

impl fmt::Display for StepWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepWarning::ConnectivityWarning(detail) => {
                write!(f, "SSH connection to GitHub not confirmed: {detail}")
            }
            StepWarning::EditorFailed(detail) => write!(f, "Editor failed: {detail}"),
            StepWarning::KeyGenerationSkipped => {
                write!(f, "No SSH key found; pushes from the container will fail")
            }
            StepWarning::KeyGenerationFailed(detail) => {
                write!(f, "SSH key generation failed: {detail}")
            }
            StepWarning::SettingIgnored(detail) => write!(f, "Check .env: {detail}"),
        }
    }
}
