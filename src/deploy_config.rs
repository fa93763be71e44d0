// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Deployment Credentials Record
//!
//! The backup container reads its credentials from the project's `.env`
//! file. The bootstrapper loads that file exactly once, into a
//! [`DeployConfig`], and hands the record to [`crate::validation`].
//!
//! Parsing follows `.env` conventions (comments, quoting, `export` prefix)
//! via `dotenvy`, but never touches the process environment.

use std::io::Read;
use std::path::Path;

/// Notion `token_v2` session cookie.
pub const NOTION_TOKEN_V2: &str = "NOTION_TOKEN_V2";
/// Notion workspace (space) identifier.
pub const NOTION_SPACE_ID: &str = "NOTION_SPACE_ID";
/// Remote the backup repository is pushed to.
pub const GITHUB_REPO_URL: &str = "GITHUB_REPO_URL";

pub const NOTION_PAGE_ID: &str = "NOTION_PAGE_ID";
pub const REPO_PATH: &str = "REPO_PATH";
pub const GIT_USER_NAME: &str = "GIT_USER_NAME";
pub const GIT_USER_EMAIL: &str = "GIT_USER_EMAIL";
pub const BACKUP_INTERVAL_HOURS: &str = "BACKUP_INTERVAL_HOURS";
pub const EXPORT_TYPE: &str = "EXPORT_TYPE";
pub const INCLUDE_FILES: &str = "INCLUDE_FILES";
pub const RECURSIVE: &str = "RECURSIVE";
pub const TIMEZONE: &str = "TIMEZONE";

/// Error loading the credentials file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] dotenvy::Error),
}

/// Credentials and service options read from `.env`.
///
/// Required keys that are absent load as empty strings so the validator can
/// report them alongside placeholder values. Optional keys stay `None` when
/// absent, meaning the container applies its own default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployConfig {
    pub notion_token_v2: String,
    pub notion_space_id: String,
    pub github_repo_url: String,
    pub notion_page_id: Option<String>,
    pub repo_path: Option<String>,
    pub git_user_name: Option<String>,
    pub git_user_email: Option<String>,
    pub backup_interval_hours: Option<String>,
    pub export_type: Option<String>,
    pub include_files: Option<String>,
    pub recursive: Option<String>,
    pub timezone: Option<String>,
}

impl DeployConfig {
    /// Load the record from a `.env` style file.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        Self::from_pairs(dotenvy::from_path_iter(path)?)
    }

    /// Load the record from any reader holding `.env` formatted text.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigLoadError> {
        Self::from_pairs(dotenvy::from_read_iter(reader))
    }

    fn from_pairs<I>(pairs: I) -> Result<Self, ConfigLoadError>
    where
        I: IntoIterator<Item = dotenvy::Result<(String, String)>>,
    {
        let mut config = Self::default();
        for pair in pairs {
            let (key, value) = pair?;
            config.set(&key, value);
        }
        Ok(config)
    }

    /// Assign a single key. Unknown keys are ignored; later assignments win.
    pub fn set(&mut self, key: &str, value: String) {
        match key {
            NOTION_TOKEN_V2 => self.notion_token_v2 = value,
            NOTION_SPACE_ID => self.notion_space_id = value,
            GITHUB_REPO_URL => self.github_repo_url = value,
            NOTION_PAGE_ID => self.notion_page_id = non_blank(value),
            REPO_PATH => self.repo_path = non_blank(value),
            GIT_USER_NAME => self.git_user_name = non_blank(value),
            GIT_USER_EMAIL => self.git_user_email = non_blank(value),
            BACKUP_INTERVAL_HOURS => self.backup_interval_hours = non_blank(value),
            EXPORT_TYPE => self.export_type = non_blank(value),
            INCLUDE_FILES => self.include_files = non_blank(value),
            RECURSIVE => self.recursive = non_blank(value),
            TIMEZONE => self.timezone = non_blank(value),
            _ => {}
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    Some(value).filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_required_and_optional_keys() {
        let text = "\
# Notion credentials
NOTION_TOKEN_V2=abc123
NOTION_SPACE_ID=\"def456\"
export GITHUB_REPO_URL=git@github.com:alice/repo.git
BACKUP_INTERVAL_HOURS=12
UNRELATED=ignored
";
        let config = DeployConfig::from_reader(text.as_bytes()).unwrap();
        assert_eq!(config.notion_token_v2, "abc123");
        assert_eq!(config.notion_space_id, "def456");
        assert_eq!(config.github_repo_url, "git@github.com:alice/repo.git");
        assert_eq!(config.backup_interval_hours.as_deref(), Some("12"));
        assert_eq!(config.export_type, None);
    }

    #[test]
    fn missing_required_keys_load_empty() {
        let config = DeployConfig::from_reader("NOTION_SPACE_ID=x\n".as_bytes()).unwrap();
        assert_eq!(config.notion_token_v2, "");
        assert_eq!(config.github_repo_url, "");
    }

    #[test]
    fn blank_optional_value_is_absent() {
        let config = DeployConfig::from_reader("EXPORT_TYPE=\n".as_bytes()).unwrap();
        assert_eq!(config.export_type, None);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "NOTION_TOKEN_V2=tok\nTIMEZONE=UTC\n").unwrap();

        let config = DeployConfig::load(&path).unwrap();
        assert_eq!(config.notion_token_v2, "tok");
        assert_eq!(config.timezone.as_deref(), Some("UTC"));
    }

    #[test]
    fn load_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(DeployConfig::load(&dir.path().join(".env")).is_err());
    }
}
