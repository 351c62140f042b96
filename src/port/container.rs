//! Container engine port.
//!
//! The launcher only needs four things from a container tool: whether it is
//! installed, whether the project's containers are already up, and how to
//! bring them up and down. The descriptor format is the engine's business.

use std::io;
use std::path::Path;

use async_trait::async_trait;

/// Result of an `up` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    /// Whether the engine reported success.
    pub success: bool,
    /// Combined diagnostic text (stderr, or stdout when stderr is empty).
    pub message: String,
}

/// A container engine driven from a project directory.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Short name used in reports.
    fn name(&self) -> &str;

    /// Whether every executable the engine needs is on `PATH`.
    fn is_available(&self) -> bool;

    /// Whether the project's containers are already running.
    async fn running(&self, workdir: &Path) -> io::Result<bool>;

    /// Start the project's containers in the background.
    async fn up(&self, workdir: &Path) -> io::Result<EngineOutput>;

    /// Stop the project's containers.
    async fn down(&self, workdir: &Path) -> io::Result<()>;
}
