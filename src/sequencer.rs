// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Bootstrap Sequencer
//!
//! Runs the deployment steps in a fixed order and stops at the first fatal
//! failure:
//!
//! 1. **Tools**: `docker` and `docker-compose` must be on `PATH`.
//! 2. **Directories**: `backups/` and `logs/` are created if absent.
//! 3. **Configuration**: `.env` is copied from `.env.example` on first run,
//!    optionally opened in `$EDITOR`.
//! 4. **Credentials**: without an SSH key the operator may generate one and
//!    register it with GitHub.
//! 5. **Connectivity**: an `ssh -T` probe against GitHub. Advisory only.
//! 6. **Validation**: the `.env` record is checked before anything is built.
//! 7. **Build** and 8. **Start** through the compose tool.
//! 9. **Logs**: follows the service logs until the operator interrupts.
//!
//! Editor, key generation and probe failures are [`StepWarning`]s: they are
//! logged and collected in the [`BootstrapReport`], and the run continues.
//! Optional `.env` settings the service would misread are reported the same
//! way.

use std::fmt;
use std::fs;
use std::future::Future;

use tracing::{debug, error, info, warn};

use crate::config::BootstrapSettings;
use crate::deploy_config::DeployConfig;
use crate::error::{BootstrapError, StepWarning};
use crate::process::{CommandRunner, CommandSpec};
use crate::prompt::Prompter;
use crate::remote;
use crate::validation;

/// A stage of the bootstrap sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ToolCheck,
    Directories,
    Configuration,
    Credentials,
    Connectivity,
    Validation,
    Build,
    Start,
    Logs,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::ToolCheck => "tool check",
            Step::Directories => "directory provisioning",
            Step::Configuration => "configuration",
            Step::Credentials => "credential bootstrap",
            Step::Connectivity => "connectivity probe",
            Step::Validation => "configuration validation",
            Step::Build => "image build",
            Step::Start => "service start",
            Step::Logs => "log attachment",
        };
        f.write_str(name)
    }
}

/// How the final log stream ended. Every variant is a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogStreamEnd {
    /// The operator interrupted the stream
    Interrupted,
    /// The log command exited by itself
    Exited(Option<i32>),
    /// The log command could not be started
    Unavailable(String),
}

/// Outcome of a run that reached the log step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub completed: Vec<Step>,
    pub warnings: Vec<StepWarning>,
    /// `.env` was created from the template during this run.
    pub config_created: bool,
    pub log_end: Option<LogStreamEnd>,
}

impl BootstrapReport {
    fn complete(&mut self, step: Step) {
        debug!(%step, "Step complete");
        self.completed.push(step);
    }

    fn warn(&mut self, warning: StepWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

fn describe_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// The sequencer, borrowing its settings and collaborators.
pub struct Bootstrap<'a, R, P> {
    settings: &'a BootstrapSettings,
    runner: &'a R,
    prompter: &'a P,
}

impl<'a, R, P> Bootstrap<'a, R, P>
where
    R: CommandRunner,
    P: Prompter,
{
    pub fn new(settings: &'a BootstrapSettings, runner: &'a R, prompter: &'a P) -> Self {
        Self {
            settings,
            runner,
            prompter,
        }
    }

    /// Run every step. `interrupt` resolves when the operator asks to stop
    /// following the logs; it is first polled once the log step begins.
    pub async fn run<F>(&self, interrupt: F) -> Result<BootstrapReport, BootstrapError>
    where
        F: Future<Output = ()>,
    {
        let mut report = BootstrapReport::default();

        self.check_tools()?;
        report.complete(Step::ToolCheck);

        self.provision_directories()?;
        report.complete(Step::Directories);

        report.config_created = self.materialize_config(&mut report).await?;
        report.complete(Step::Configuration);

        self.bootstrap_credentials(&mut report).await;
        report.complete(Step::Credentials);

        self.probe_connectivity(&mut report).await;
        report.complete(Step::Connectivity);

        let config = self.validate_config()?;
        for advisory in validation::advisories(&config) {
            report.warn(StepWarning::SettingIgnored(advisory.to_string()));
        }
        info!(
            push_url = %remote::effective_push_url(&config.github_repo_url),
            "Configuration is valid"
        );
        report.complete(Step::Validation);

        self.build_image().await?;
        report.complete(Step::Build);

        self.start_service().await?;
        report.complete(Step::Start);

        report.log_end = Some(self.follow_logs(interrupt).await);
        report.complete(Step::Logs);

        Ok(report)
    }

    /// Fail with `MissingDependency` for the first tool not on `PATH`.
    pub fn check_tools(&self) -> Result<(), BootstrapError> {
        for tool in &self.settings.tools {
            match self.runner.locate(&tool.program) {
                Some(path) => debug!(tool = %tool.program, path = %path.display(), "Found tool"),
                None => {
                    return Err(BootstrapError::MissingDependency {
                        tool: tool.program.clone(),
                        install_hint: tool.install_hint.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Create the working directories. Safe to repeat.
    pub fn provision_directories(&self) -> Result<(), BootstrapError> {
        for dir in self.settings.paths.working_dirs() {
            fs::create_dir_all(&dir).map_err(|e| {
                BootstrapError::io(format!("failed to create {}", dir.display()), e)
            })?;
        }
        Ok(())
    }

    /// Ensure `.env` exists, copying the template on first run. Returns
    /// whether the file was created.
    pub async fn materialize_config(
        &self,
        report: &mut BootstrapReport,
    ) -> Result<bool, BootstrapError> {
        let env_file = self.settings.paths.env_file();
        if env_file.exists() {
            debug!(path = %env_file.display(), "Configuration file present");
            return Ok(false);
        }

        let template = self.settings.paths.env_template();
        if !template.exists() {
            return Err(BootstrapError::MissingTemplate { path: template });
        }
        fs::copy(&template, &env_file).map_err(|e| {
            BootstrapError::io(
                format!("failed to copy {} to {}", template.display(), env_file.display()),
                e,
            )
        })?;
        info!(path = %env_file.display(), "Created configuration from template");

        let edit = match self.prompter.confirm("Edit .env now to fill in your credentials?") {
            Ok(edit) => edit,
            Err(e) => {
                debug!(error = %e, "No answer to edit prompt");
                false
            }
        };
        if !edit {
            info!(path = %env_file.display(), "Fill in the credentials before deploying");
            return Ok(true);
        }

        let mut words = self.settings.editor.split_whitespace();
        let program = words.next().unwrap_or(crate::config::DEFAULT_EDITOR);
        let command = CommandSpec::new(program)
            .args(words)
            .arg(env_file.to_string_lossy());
        match self.runner.attach(&command).await {
            Ok(Some(0)) => {}
            Ok(status) => report.warn(StepWarning::EditorFailed(format!(
                "`{}` ended with {}",
                self.settings.editor,
                describe_status(status)
            ))),
            Err(e) => report.warn(StepWarning::EditorFailed(e.to_string())),
        }
        Ok(true)
    }

    /// Offer to create an SSH key when none of the conventional ones exist.
    pub async fn bootstrap_credentials(&self, report: &mut BootstrapReport) {
        let Some(ssh) = &self.settings.ssh else {
            debug!("No home directory; skipping SSH key discovery");
            report.warn(StepWarning::KeyGenerationSkipped);
            return;
        };
        if let Some(key) = ssh.existing_key() {
            info!(key = %key.display(), "Using existing SSH key");
            return;
        }

        let generate = self
            .prompter
            .confirm("No SSH key found. Generate a new ed25519 key now?")
            .unwrap_or(false);
        if !generate {
            report.warn(StepWarning::KeyGenerationSkipped);
            return;
        }

        let email = match self.prompter.ask("Email address for the key comment:") {
            Ok(email) if !email.is_empty() => email,
            Ok(_) => {
                report.warn(StepWarning::KeyGenerationFailed("no email given".to_string()));
                return;
            }
            Err(e) => {
                report.warn(StepWarning::KeyGenerationFailed(e.to_string()));
                return;
            }
        };

        if let Err(e) = fs::create_dir_all(ssh.ssh_dir()) {
            report.warn(StepWarning::KeyGenerationFailed(format!(
                "failed to create {}: {e}",
                ssh.ssh_dir().display()
            )));
            return;
        }

        let key_path = ssh.ed25519_key();
        let keygen = CommandSpec::new("ssh-keygen").args([
            "-t".to_string(),
            "ed25519".to_string(),
            "-C".to_string(),
            email,
            "-f".to_string(),
            key_path.to_string_lossy().into_owned(),
            "-N".to_string(),
            String::new(),
        ]);
        match self.runner.attach(&keygen).await {
            Ok(Some(0)) => {}
            Ok(status) => {
                report.warn(StepWarning::KeyGenerationFailed(describe_status(status)));
                return;
            }
            Err(e) => {
                report.warn(StepWarning::KeyGenerationFailed(e.to_string()));
                return;
            }
        }

        let public_key = match fs::read_to_string(ssh.ed25519_public_key()) {
            Ok(key) => key,
            Err(e) => {
                report.warn(StepWarning::KeyGenerationFailed(format!(
                    "failed to read {}: {e}",
                    ssh.ed25519_public_key().display()
                )));
                return;
            }
        };
        info!(key = %key_path.display(), "Generated SSH key");

        println!();
        println!("Add this public key at https://{}/settings/keys :", remote::GIT_HOST);
        println!();
        println!("{}", public_key.trim_end());
        println!();
        // Any answer, or none, continues.
        let _ = self
            .prompter
            .ask("Press Enter once the key has been added...");
    }

    /// Attempt an authenticated SSH handshake with GitHub. Never fatal.
    pub async fn probe_connectivity(&self, report: &mut BootstrapReport) {
        let probe = CommandSpec::new("ssh").args(remote::probe_args());
        match self.runner.capture(&probe).await {
            Ok(capture) if remote::probe_succeeded(&capture.combined()) => {
                info!(host = remote::GIT_HOST, "SSH authentication confirmed");
            }
            Ok(capture) => {
                let combined = capture.combined();
                let detail = combined
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| describe_status(capture.status));
                report.warn(StepWarning::ConnectivityWarning(detail));
            }
            Err(e) => report.warn(StepWarning::ConnectivityWarning(e.to_string())),
        }
    }

    /// Load `.env` once and reject it if any field is invalid.
    pub fn validate_config(&self) -> Result<DeployConfig, BootstrapError> {
        let path = self.settings.paths.env_file();
        let config = DeployConfig::load(&path)
            .map_err(|source| BootstrapError::ConfigUnreadable { path, source })?;

        let violations = validation::validate(&config);
        if violations.is_empty() {
            return Ok(config);
        }
        for violation in &violations {
            error!(field = violation.field.key(), "{violation}");
        }
        Err(BootstrapError::ConfigurationInvalid { violations })
    }

    fn compose(&self, args: &[&str]) -> CommandSpec {
        CommandSpec::new(&self.settings.compose_tool)
            .args(args.iter().copied())
            .current_dir(self.settings.paths.root())
    }

    pub async fn build_image(&self) -> Result<(), BootstrapError> {
        info!("Building container image");
        match self.runner.attach(&self.compose(&["build"])).await {
            Ok(Some(0)) => Ok(()),
            Ok(status) => Err(BootstrapError::BuildFailed {
                detail: describe_status(status),
            }),
            Err(e) => Err(BootstrapError::BuildFailed {
                detail: e.to_string(),
            }),
        }
    }

    pub async fn start_service(&self) -> Result<(), BootstrapError> {
        info!("Starting backup service");
        match self.runner.attach(&self.compose(&["up", "-d"])).await {
            Ok(Some(0)) => Ok(()),
            Ok(status) => Err(BootstrapError::StartFailed {
                detail: describe_status(status),
            }),
            Err(e) => Err(BootstrapError::StartFailed {
                detail: e.to_string(),
            }),
        }
    }

    /// Follow the service logs until `interrupt` resolves or the stream ends.
    pub async fn follow_logs<F>(&self, interrupt: F) -> LogStreamEnd
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        let delay = self.settings.log_attach_delay;
        if !delay.is_zero() {
            tokio::select! {
                biased;
                () = &mut interrupt => {
                    info!("Interrupted before following logs");
                    return LogStreamEnd::Interrupted;
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
        info!("Following service logs; press Ctrl-C to stop (the service keeps running)");

        let logs = self.compose(&["logs", "-f"]);
        // The log command is started before the interrupt is checked.
        tokio::select! {
            biased;
            result = self.runner.attach(&logs) => match result {
                Ok(status) => {
                    info!(status = %describe_status(status), "Log stream ended");
                    LogStreamEnd::Exited(status)
                }
                Err(e) => {
                    warn!(error = %e, "Could not follow service logs");
                    LogStreamEnd::Unavailable(e.to_string())
                }
            },
            () = &mut interrupt => {
                info!("Stopped following logs");
                LogStreamEnd::Interrupted
            }
        }
    }
}
