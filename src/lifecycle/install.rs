//! First-run dependency installation.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use crate::error::{Error, Result};

/// What [`DependencyInstaller::ensure_installed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyInstalled,
    Installed,
}

/// Installs a workspace's dependencies when its cache marker is missing.
#[derive(Debug, Clone)]
pub struct DependencyInstaller {
    marker: String,
    command: Vec<String>,
}

impl DependencyInstaller {
    pub fn new(marker: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            marker: marker.into(),
            command,
        }
    }

    /// Run the installer in `workspace` unless the marker directory exists.
    ///
    /// The installer inherits stdout/stderr so the operator sees its progress.
    ///
    /// # Errors
    ///
    /// A failed install is fatal: later launches depend on it.
    pub async fn ensure_installed(&self, workspace: &Path) -> Result<InstallOutcome> {
        if workspace.join(&self.marker).is_dir() {
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        let Some((program, args)) = self.command.split_first() else {
            return Err(Error::InstallFailed {
                dir: workspace.to_path_buf(),
                reason: "no installer command configured".to_string(),
            });
        };

        info!(workspace = %workspace.display(), command = ?self.command, "Installing dependencies");
        let status = Command::new(program)
            .args(args)
            .current_dir(workspace)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| Error::InstallFailed {
                dir: workspace.to_path_buf(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(Error::InstallFailed {
                dir: workspace.to_path_buf(),
                reason: format!("installer exited with {status}"),
            });
        }
        Ok(InstallOutcome::Installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[tokio::test]
    async fn present_marker_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        let installer = DependencyInstaller::new("node_modules", sh("touch ran"));

        let outcome = installer.ensure_installed(dir.path()).await.unwrap();

        assert_eq!(outcome, InstallOutcome::AlreadyInstalled);
        assert!(!dir.path().join("ran").exists());
    }

    #[tokio::test]
    async fn missing_marker_runs_installer_in_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let installer = DependencyInstaller::new("node_modules", sh("mkdir node_modules"));

        let outcome = installer.ensure_installed(dir.path()).await.unwrap();

        assert_eq!(outcome, InstallOutcome::Installed);
        assert!(dir.path().join("node_modules").is_dir());
    }

    #[tokio::test]
    async fn failing_installer_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let installer = DependencyInstaller::new("node_modules", sh("exit 3"));

        let err = installer.ensure_installed(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::InstallFailed { .. }));
    }

    #[tokio::test]
    async fn unspawnable_installer_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let installer =
            DependencyInstaller::new("node_modules", vec!["stackup-no-such-installer".into()]);

        assert!(installer.ensure_installed(dir.path()).await.is_err());
    }
}
