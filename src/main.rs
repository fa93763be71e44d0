// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use notion_backup_deploy::config::BootstrapSettings;
use notion_backup_deploy::error::{BootstrapError, FAILURE_EXIT_CODE};
use notion_backup_deploy::logging;
use notion_backup_deploy::process::SystemRunner;
use notion_backup_deploy::prompt::TerminalPrompter;
use notion_backup_deploy::sequencer::Bootstrap;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let settings = match BootstrapSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Cannot determine the project directory");
            return ExitCode::from(FAILURE_EXIT_CODE);
        }
    };

    println!("Notion Backup - deployment");
    println!("Project directory: {}", settings.paths.root().display());

    let runner = SystemRunner;
    let prompter = TerminalPrompter;
    let bootstrap = Bootstrap::new(&settings, &runner, &prompter);

    // The signal handler is installed only once log following starts, so
    // Ctrl-C during the prompts still terminates immediately.
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    match bootstrap.run(interrupt).await {
        Ok(report) => {
            for warning in &report.warnings {
                println!("warning: {warning}");
            }
            println!("The backup service is running in the background.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn report_failure(error: &BootstrapError) {
    tracing::error!(error = %error, "Deployment aborted");
    eprintln!("error: {error}");
    if let Some(hint) = error.operator_hint() {
        eprintln!("{hint}");
    }
}
