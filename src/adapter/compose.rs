//! `docker-compose` command line as a [`ContainerEngine`].

use std::io;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::port::{ContainerEngine, EngineOutput};

/// Drives a compose-style CLI (`<program> ps -q`, `up -d`, `down`).
#[derive(Debug, Clone)]
pub struct ComposeCli {
    program: String,
    requires: Vec<String>,
}

impl ComposeCli {
    /// `program` is invoked for every operation; `requires` lists every
    /// executable that must be on `PATH` for the engine to count as available.
    pub fn new(program: impl Into<String>, requires: Vec<String>) -> Self {
        Self {
            program: program.into(),
            requires,
        }
    }

    fn command(&self, workdir: &Path, args: &[&str]) -> Command {
        debug!(program = %self.program, ?args, workdir = %workdir.display(), "container engine");
        let mut cmd = Command::new(&self.program);
        cmd.args(args).current_dir(workdir).stdin(Stdio::null());
        cmd
    }
}

#[async_trait]
impl ContainerEngine for ComposeCli {
    fn name(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
            && self.requires.iter().all(|exe| which::which(exe).is_ok())
    }

    async fn running(&self, workdir: &Path) -> io::Result<bool> {
        let output = self.command(workdir, &["ps", "-q"]).output().await?;
        Ok(output.status.success() && !String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }

    async fn up(&self, workdir: &Path) -> io::Result<EngineOutput> {
        let output = self.command(workdir, &["up", "-d"]).output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            stderr.into_owned()
        };

        Ok(EngineOutput {
            success: output.status.success(),
            message,
        })
    }

    async fn down(&self, workdir: &Path) -> io::Result<()> {
        let status = self
            .command(workdir, &["down"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("{} down failed: {status}", self.program)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_when_program_missing() {
        let engine = ComposeCli::new("stackup-no-such-compose", vec![]);
        assert!(!engine.is_available());
    }

    #[test]
    fn unavailable_when_any_requirement_missing() {
        let engine = ComposeCli::new("sh", vec!["stackup-no-such-engine".into()]);
        assert!(!engine.is_available());
    }

    #[tokio::test]
    async fn spawn_failure_is_an_io_error() {
        let engine = ComposeCli::new("stackup-no-such-compose", vec![]);
        let dir = tempfile::tempdir().unwrap();
        assert!(engine.running(dir.path()).await.is_err());
    }
}
