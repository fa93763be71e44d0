// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pre-flight validation of the credentials record.
//!
//! [`validate`] is pure: it takes the loaded [`DeployConfig`] and returns
//! every violation of the three required fields. Fields are checked
//! independently, so the result only depends on field order for reporting.
//!
//! Optional service settings never block a deployment. [`advisories`]
//! describes values the service will read differently than the operator
//! probably intended.

use std::fmt;

use crate::deploy_config::{self, DeployConfig};

/// Value shipped in `.env.example` for the Notion session token.
pub const TOKEN_PLACEHOLDER: &str = "your_token_v2_here";

/// Value shipped in `.env.example` for the Notion space id.
pub const SPACE_ID_PLACEHOLDER: &str = "your_space_id_here";

/// Substring marking a repository URL the operator has not edited.
pub const REPO_URL_PLACEHOLDER: &str = "yourusername";

/// `EXPORT_TYPE` values the Notion export understands.
pub const EXPORT_TYPES: [&str; 2] = ["markdown", "html"];

/// A configuration key inspected before deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    NotionTokenV2,
    NotionSpaceId,
    GithubRepoUrl,
    BackupIntervalHours,
    ExportType,
    IncludeFiles,
    Recursive,
}

impl Field {
    /// Key name as written in `.env`.
    pub fn key(self) -> &'static str {
        match self {
            Field::NotionTokenV2 => deploy_config::NOTION_TOKEN_V2,
            Field::NotionSpaceId => deploy_config::NOTION_SPACE_ID,
            Field::GithubRepoUrl => deploy_config::GITHUB_REPO_URL,
            Field::BackupIntervalHours => deploy_config::BACKUP_INTERVAL_HOURS,
            Field::ExportType => deploy_config::EXPORT_TYPE,
            Field::IncludeFiles => deploy_config::INCLUDE_FILES,
            Field::Recursive => deploy_config::RECURSIVE,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why a required field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Empty or only whitespace
    Missing,
    /// Still holds the template's placeholder
    Placeholder,
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: Field,
    pub reason: Reason,
}

impl Violation {
    fn new(field: Field, reason: Reason) -> Self {
        Self { field, reason }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            Reason::Missing => write!(f, "{} is not set", self.field),
            Reason::Placeholder => write!(f, "{} still has its placeholder value", self.field),
        }
    }
}

/// An optional setting the service will accept but interpret surprisingly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub field: Field,
    pub message: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Check the required fields of `config`, returning all violations in key
/// order.
pub fn validate(config: &DeployConfig) -> Vec<Violation> {
    [
        (Field::NotionTokenV2, check_token(&config.notion_token_v2)),
        (Field::NotionSpaceId, check_space_id(&config.notion_space_id)),
        (Field::GithubRepoUrl, check_repo_url(&config.github_repo_url)),
    ]
    .into_iter()
    .filter_map(|(field, reason)| reason.map(|reason| Violation::new(field, reason)))
    .collect()
}

pub fn check_token(value: &str) -> Option<Reason> {
    check_required(value, |v| v == TOKEN_PLACEHOLDER)
}

pub fn check_space_id(value: &str) -> Option<Reason> {
    check_required(value, |v| v == SPACE_ID_PLACEHOLDER)
}

/// Any non-empty remote git understands is accepted, as long as it is not
/// the template's.
pub fn check_repo_url(value: &str) -> Option<Reason> {
    check_required(value, |v| v.contains(REPO_URL_PLACEHOLDER))
}

fn check_required(value: &str, is_placeholder: impl Fn(&str) -> bool) -> Option<Reason> {
    let value = value.trim();
    if value.is_empty() {
        Some(Reason::Missing)
    } else if is_placeholder(value) {
        Some(Reason::Placeholder)
    } else {
        None
    }
}

/// Describe optional settings the service will read differently than
/// written. Never fatal.
pub fn advisories(config: &DeployConfig) -> Vec<Advisory> {
    let mut found = Vec::new();
    let mut note = |field: Field, message: Option<String>| {
        if let Some(message) = message {
            found.push(Advisory { field, message });
        }
    };

    note(
        Field::BackupIntervalHours,
        config.backup_interval_hours.as_deref().and_then(interval_note),
    );
    note(Field::ExportType, config.export_type.as_deref().and_then(export_type_note));
    note(Field::IncludeFiles, config.include_files.as_deref().and_then(flag_note));
    note(Field::Recursive, config.recursive.as_deref().and_then(flag_note));
    found
}

fn interval_note(value: &str) -> Option<String> {
    match value.trim().parse::<u32>() {
        Ok(hours) if hours > 0 => None,
        _ => Some(format!("is `{value}`; the service expects a positive number of hours")),
    }
}

fn export_type_note(value: &str) -> Option<String> {
    (!EXPORT_TYPES.contains(&value.trim())).then(|| {
        format!("is `{value}`; Notion exports {}", EXPORT_TYPES.join(" or "))
    })
}

/// The service treats anything but `true` (any case) as false.
fn flag_note(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.eq_ignore_ascii_case("true") && !value.eq_ignore_ascii_case("false"))
        .then(|| format!("is `{value}`; the service will read it as false"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> DeployConfig {
        DeployConfig {
            notion_token_v2: "abc123".to_string(),
            notion_space_id: "def456".to_string(),
            github_repo_url: "git@github.com:alice/repo.git".to_string(),
            ..DeployConfig::default()
        }
    }

    fn fields(violations: &[Violation]) -> Vec<Field> {
        violations.iter().map(|v| v.field).collect()
    }

    #[test]
    fn well_formed_record_has_no_violations() {
        assert!(validate(&valid()).is_empty());
    }

    #[test]
    fn empty_required_fields_are_reported_individually() {
        let mut config = valid();
        config.notion_token_v2 = String::new();
        assert_eq!(fields(&validate(&config)), vec![Field::NotionTokenV2]);

        let mut config = valid();
        config.notion_space_id = "  ".to_string();
        assert_eq!(fields(&validate(&config)), vec![Field::NotionSpaceId]);

        let mut config = valid();
        config.github_repo_url = String::new();
        let violations = validate(&config);
        assert_eq!(fields(&violations), vec![Field::GithubRepoUrl]);
        assert_eq!(violations[0].reason, Reason::Missing);
    }

    #[test]
    fn placeholders_are_rejected() {
        let mut config = valid();
        config.notion_token_v2 = TOKEN_PLACEHOLDER.to_string();
        config.notion_space_id = SPACE_ID_PLACEHOLDER.to_string();
        config.github_repo_url = "https://github.com/yourusername/repo.git".to_string();

        let violations = validate(&config);
        assert_eq!(
            fields(&violations),
            vec![Field::NotionTokenV2, Field::NotionSpaceId, Field::GithubRepoUrl]
        );
        assert!(violations.iter().all(|v| v.reason == Reason::Placeholder));
    }

    #[test]
    fn placeholder_repo_url_alone_names_only_that_field() {
        let mut config = valid();
        config.github_repo_url = "https://github.com/yourusername/repo.git".to_string();
        let violations = validate(&config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "GITHUB_REPO_URL still has its placeholder value");
    }

    #[test]
    fn any_remote_git_understands_is_accepted() {
        for url in [
            "https://github.com/alice/repo.git",
            "git@github.com:alice/repo.git",
            "ssh://git@github.com/alice/repo.git",
            "file:///srv/notion-backup.git",
            "/srv/notion-backup.git",
        ] {
            assert_eq!(check_repo_url(url), None, "{url}");
        }
    }

    #[test]
    fn optional_settings_never_fail_validation() {
        let mut config = valid();
        config.github_repo_url = "file:///srv/b.git".to_string();
        config.include_files = Some("yes".to_string());
        config.git_user_email = Some("bot".to_string());
        config.backup_interval_hours = Some("0".to_string());
        config.export_type = Some("pdf".to_string());

        assert!(validate(&config).is_empty());
    }

    #[test]
    fn advisories_follow_how_the_service_reads_values() {
        let mut config = valid();
        config.backup_interval_hours = Some("0".to_string());
        config.export_type = Some("pdf".to_string());
        config.include_files = Some("yes".to_string());
        config.recursive = Some("FALSE".to_string());

        let found = advisories(&config);
        let fields: Vec<_> = found.iter().map(|a| a.field).collect();
        assert_eq!(
            fields,
            vec![Field::BackupIntervalHours, Field::ExportType, Field::IncludeFiles]
        );
        assert_eq!(
            found[2].to_string(),
            "INCLUDE_FILES is `yes`; the service will read it as false"
        );
    }

    #[test]
    fn service_values_produce_no_advisories() {
        let mut config = valid();
        config.backup_interval_hours = Some("24".to_string());
        config.export_type = Some("html".to_string());
        config.include_files = Some("True".to_string());
        assert!(advisories(&config).is_empty());
    }
}
