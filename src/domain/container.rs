//! Container backend started by this run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::port::ContainerEngine;

/// Proof that this run brought containerized services up.
///
/// Only a run that actually started containers holds one, so only that run
/// tears them down at shutdown.
#[derive(Clone)]
pub struct ContainerBackend {
    engine: Arc<dyn ContainerEngine>,
    workdir: PathBuf,
}

impl ContainerBackend {
    pub fn new(engine: Arc<dyn ContainerEngine>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            workdir: workdir.into(),
        }
    }

    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    #[must_use]
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Stop the containerized services.
    pub async fn teardown(&self) -> std::io::Result<()> {
        self.engine.down(&self.workdir).await
    }
}

impl fmt::Debug for ContainerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBackend")
            .field("engine", &self.engine.name())
            .field("workdir", &self.workdir)
            .finish()
    }
}
