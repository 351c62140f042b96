//! Optional containerized auxiliary services.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::ContainerBackend;
use crate::port::ContainerEngine;

/// Longest engine diagnostic kept in a [`ContainerOutcome::Failed`].
const MAX_DIAGNOSTIC_CHARS: usize = 100;

/// Why container start was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    EngineUnavailable,
    DescriptorMissing,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "container services disabled"),
            Self::EngineUnavailable => write!(f, "container engine not found"),
            Self::DescriptorMissing => write!(f, "container descriptor not found"),
        }
    }
}

/// How container start went. None of these stop the run.
#[derive(Debug)]
pub enum ContainerOutcome {
    Skipped(SkipReason),
    /// Containers were already up; this run will not tear them down.
    AlreadyRunning,
    /// This run started the containers and owns their teardown.
    Started(ContainerBackend),
    Failed(String),
}

/// Starts containerized services if the engine and descriptor are available.
pub struct ContainerBackendStarter {
    engine: Arc<dyn ContainerEngine>,
    descriptor: String,
    settle: Duration,
}

impl ContainerBackendStarter {
    pub fn new(engine: Arc<dyn ContainerEngine>, descriptor: impl Into<String>, settle: Duration) -> Self {
        Self {
            engine,
            descriptor: descriptor.into(),
            settle,
        }
    }

    /// Bring containers up in `workspace`, waiting the settle delay on success.
    pub async fn start(&self, workspace: &Path) -> ContainerOutcome {
        if !self.engine.is_available() {
            warn!(engine = %self.engine.name(), "Container engine not found, skipping container services");
            return ContainerOutcome::Skipped(SkipReason::EngineUnavailable);
        }
        if !workspace.join(&self.descriptor).is_file() {
            warn!(descriptor = %self.descriptor, "Container descriptor not found");
            return ContainerOutcome::Skipped(SkipReason::DescriptorMissing);
        }

        match self.engine.running(workspace).await {
            Ok(true) => {
                info!("Container services already running");
                return ContainerOutcome::AlreadyRunning;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "Failed to query container services");
                return ContainerOutcome::Failed(truncate(&e.to_string()));
            }
        }

        let output = match self.engine.up(workspace).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "Failed to start container services");
                return ContainerOutcome::Failed(truncate(&e.to_string()));
            }
        };

        if output.success {
            info!(settle_secs = self.settle.as_secs(), "Container services started, waiting for them to settle");
            tokio::time::sleep(self.settle).await;
            return ContainerOutcome::Started(ContainerBackend::new(
                Arc::clone(&self.engine),
                workspace,
            ));
        }

        let lowered = output.message.to_lowercase();
        if lowered.contains("already") || lowered.contains("up-to-date") {
            info!("Container services already running");
            ContainerOutcome::AlreadyRunning
        } else {
            warn!(message = %output.message.trim(), "Container services reported a problem");
            ContainerOutcome::Failed(truncate(output.message.trim()))
        }
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_DIAGNOSTIC_CHARS).collect()
}
