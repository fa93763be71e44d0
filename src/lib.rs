// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Notion Backup Deploy - operator bootstrap for the backup container
//!
//! This crate prepares a host to run the Notion to GitHub backup service:
//! it checks the container toolchain, materializes and validates the `.env`
//! credentials, makes sure an SSH key exists for pushing, then builds and
//! starts the service with the compose tool and follows its logs.
//!
//! ## Modules
//!
//! - `sequencer` - The ordered bootstrap steps
//! - `deploy_config` / `validation` - The `.env` record and its checks
//! - `process` / `prompt` - Seams for external tools and operator input
//! - `config` / `paths` - Environment settings and file layout

pub mod config;
pub mod deploy_config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod process;
pub mod prompt;
pub mod remote;
pub mod sequencer;
pub mod validation;
