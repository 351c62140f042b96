//! Required executable checks.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::config::Prerequisite;

const VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// A prerequisite found on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundTool {
    pub name: String,
    pub path: PathBuf,
    /// First line of `<command> --version`, when it could be obtained.
    pub version: Option<String>,
}

/// Result of a prerequisite check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrerequisiteReport {
    pub found: Vec<FoundTool>,
    /// Display names of executables not found on `PATH`.
    pub missing: Vec<String>,
}

impl PrerequisiteReport {
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Verifies required executables are present before any side effect.
#[derive(Debug, Clone, Default)]
pub struct PrerequisiteChecker;

impl PrerequisiteChecker {
    pub fn new() -> Self {
        Self
    }

    /// Look up every prerequisite on `PATH` and collect versions of those found.
    pub async fn check(&self, required: &[Prerequisite]) -> PrerequisiteReport {
        let mut report = PrerequisiteReport::default();

        for prerequisite in required {
            match which::which(&prerequisite.command) {
                Ok(path) => {
                    let version = probe_version(&prerequisite.command).await;
                    debug!(command = %prerequisite.command, path = %path.display(), ?version, "Found prerequisite");
                    report.found.push(FoundTool {
                        name: prerequisite.name.clone(),
                        path,
                        version,
                    });
                }
                Err(_) => report.missing.push(prerequisite.name.clone()),
            }
        }

        report
    }
}

async fn probe_version(command: &str) -> Option<String> {
    let output = Command::new(command)
        .arg("--version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();
    let output = tokio::time::timeout(VERSION_TIMEOUT, output).await.ok()?.ok()?;

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(ToOwned::to_owned)
}
