// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the deployment layout.

use std::path::{Path, PathBuf};

/// Credentials file read by the compose project.
pub const ENV_FILE: &str = ".env";

/// Template copied to [`ENV_FILE`] on first run.
pub const ENV_TEMPLATE: &str = ".env.example";

/// Host directory mounted as the backup repository.
pub const BACKUPS_DIR: &str = "backups";

/// Host directory mounted for service logs.
pub const LOGS_DIR: &str = "logs";

/// Project-relative paths used by the bootstrapper.
#[derive(Debug, Clone)]
pub struct DeployPaths {
    root: PathBuf,
}

impl DeployPaths {
    /// Create paths rooted at the compose project directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Compose project directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn env_file(&self) -> PathBuf {
        self.root.join(ENV_FILE)
    }

    pub fn env_template(&self) -> PathBuf {
        self.root.join(ENV_TEMPLATE)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    /// Directories created during provisioning, in creation order.
    pub fn working_dirs(&self) -> [PathBuf; 2] {
        [self.backups_dir(), self.logs_dir()]
    }
}

/// Conventional SSH key locations under a home directory.
#[derive(Debug, Clone)]
pub struct SshPaths {
    home: PathBuf,
}

impl SshPaths {
    pub fn new(home: impl AsRef<Path>) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
        }
    }

    pub fn ssh_dir(&self) -> PathBuf {
        self.home.join(".ssh")
    }

    /// Key written when the operator opts into generation.
    pub fn ed25519_key(&self) -> PathBuf {
        self.ssh_dir().join("id_ed25519")
    }

    pub fn ed25519_public_key(&self) -> PathBuf {
        self.ssh_dir().join("id_ed25519.pub")
    }

    pub fn rsa_key(&self) -> PathBuf {
        self.ssh_dir().join("id_rsa")
    }

    /// Private keys whose presence means no key bootstrap is needed.
    pub fn known_keys(&self) -> [PathBuf; 2] {
        [self.ed25519_key(), self.rsa_key()]
    }

    /// First conventional key that exists on disk.
    pub fn existing_key(&self) -> Option<PathBuf> {
        self.known_keys().into_iter().find(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn deploy_paths_are_correct() {
        let paths = DeployPaths::new("/srv/notion");
        assert_eq!(paths.env_file(), PathBuf::from("/srv/notion/.env"));
        assert_eq!(paths.env_template(), PathBuf::from("/srv/notion/.env.example"));
        assert_eq!(
            paths.working_dirs(),
            [
                PathBuf::from("/srv/notion/backups"),
                PathBuf::from("/srv/notion/logs")
            ]
        );
    }

    #[test]
    fn ssh_paths_are_correct() {
        let ssh = SshPaths::new("/home/op");
        assert_eq!(ssh.ed25519_key(), PathBuf::from("/home/op/.ssh/id_ed25519"));
        assert_eq!(
            ssh.ed25519_public_key(),
            PathBuf::from("/home/op/.ssh/id_ed25519.pub")
        );
        assert_eq!(ssh.rsa_key(), PathBuf::from("/home/op/.ssh/id_rsa"));
    }

    #[test]
    fn existing_key_finds_rsa_fallback() {
        let home = TempDir::new().unwrap();
        let ssh = SshPaths::new(home.path());
        assert!(ssh.existing_key().is_none());

        std::fs::create_dir_all(ssh.ssh_dir()).unwrap();
        std::fs::write(ssh.rsa_key(), "key").unwrap();
        assert_eq!(ssh.existing_key(), Some(ssh.rsa_key()));
    }
}
