//! In-memory container engine.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use stackup::port::{ContainerEngine, EngineOutput};

/// Counts `up`/`down` calls and reports containers as not yet running.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    ups: AtomicUsize,
    downs: AtomicUsize,
}

impl RecordingEngine {
    pub fn ups(&self) -> usize {
        self.ups.load(Ordering::SeqCst)
    }

    pub fn downs(&self) -> usize {
        self.downs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn running(&self, _workdir: &Path) -> io::Result<bool> {
        Ok(false)
    }

    async fn up(&self, _workdir: &Path) -> io::Result<EngineOutput> {
        self.ups.fetch_add(1, Ordering::SeqCst);
        Ok(EngineOutput {
            success: true,
            message: String::new(),
        })
    }

    async fn down(&self, _workdir: &Path) -> io::Result<()> {
        self.downs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
