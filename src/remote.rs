// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The git host the backup container pushes to.
//!
//! The container image accepts this host's key non-interactively and
//! rewrites HTTPS remotes to SSH with a global `insteadOf` rule, so an
//! operator may write either form in `GITHUB_REPO_URL`.

/// Git host the backups are pushed to.
pub const GIT_HOST: &str = "github.com";

/// SSH login used for pushes and for the connectivity probe.
pub const SSH_LOGIN: &str = "git@github.com";

/// Text `ssh -T` prints once the key is accepted.
pub const PROBE_SUCCESS_MARKER: &str = "successfully authenticated";

/// HTTPS prefix rewritten by the container's git configuration.
pub const HTTPS_PREFIX: &str = "https://github.com/";

/// Replacement for [`HTTPS_PREFIX`].
pub const SSH_PREFIX: &str = "git@github.com:";

/// Arguments for `ssh` that attempt an authenticated handshake without
/// opening a shell.
pub fn probe_args() -> Vec<String> {
    ["-T", "-o", "StrictHostKeyChecking=accept-new", SSH_LOGIN]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Whether probe output reports a successful authentication.
///
/// GitHub answers with a non-zero exit status even on success, so only the
/// text is inspected.
pub fn probe_succeeded(output: &str) -> bool {
    output.contains(PROBE_SUCCESS_MARKER)
}

/// The remote git will actually contact inside the container.
pub fn effective_push_url(repo_url: &str) -> String {
    let repo_url = repo_url.trim();
    match repo_url.strip_prefix(HTTPS_PREFIX) {
        Some(rest) => format!("{SSH_PREFIX}{rest}"),
        None => repo_url.to_string(),
    }
}
