//! The supervisor's single mutable aggregate.

use tracing::warn;

use crate::domain::container::ContainerBackend;
use crate::domain::process::ProcessHandle;

/// Processes the supervisor is responsible for.
///
/// A handle is present only while its process is believed alive: it enters
/// after a confirmed start and leaves when observed exited or terminated.
/// There is exactly one mutator at a time (the supervisor loop or the shutdown
/// path), so no lock guards this.
#[derive(Debug, Default)]
pub struct SupervisorState {
    tracked: Vec<ProcessHandle>,
    container: Option<ContainerBackend>,
    shutting_down: bool,
}

impl SupervisorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a running process.
    ///
    /// Hands the handle back if a process with the same name is already
    /// tracked or the handle has already been observed exited.
    pub fn track(&mut self, handle: ProcessHandle) -> Result<(), ProcessHandle> {
        if handle.exit().is_some() || self.tracked.iter().any(|h| h.name() == handle.name()) {
            return Err(handle);
        }
        self.tracked.push(handle);
        Ok(())
    }

    /// Tracked handles in insertion order.
    #[must_use]
    pub fn tracked(&self) -> &[ProcessHandle] {
        &self.tracked
    }

    pub fn tracked_mut(&mut self) -> &mut [ProcessHandle] {
        &mut self.tracked
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    #[must_use]
    pub fn is_tracked(&self, name: &str) -> bool {
        self.tracked.iter().any(|h| h.name() == name)
    }

    pub fn set_container_backend(&mut self, backend: ContainerBackend) {
        self.container = Some(backend);
    }

    #[must_use]
    pub fn container_backend(&self) -> Option<&ContainerBackend> {
        self.container.as_ref()
    }

    pub fn take_container_backend(&mut self) -> Option<ContainerBackend> {
        self.container.take()
    }

    /// Poll every tracked process and remove the ones that are gone.
    ///
    /// A process whose status cannot be queried is no longer confirmed alive
    /// and is removed as well; its handle carries no exit info.
    pub fn reap_exited(&mut self) -> Vec<ProcessHandle> {
        let mut exited = Vec::new();
        let mut alive = Vec::with_capacity(self.tracked.len());

        for mut handle in self.tracked.drain(..) {
            match handle.poll_exit() {
                Ok(None) => alive.push(handle),
                Ok(Some(_)) => exited.push(handle),
                Err(e) => {
                    warn!(service = %handle.name(), error = %e, "Failed to query process status");
                    exited.push(handle);
                }
            }
        }

        self.tracked = alive;
        exited
    }

    /// Mark shutdown as started. Returns `false` if it already was.
    pub fn begin_shutdown(&mut self) -> bool {
        !std::mem::replace(&mut self.shutting_down, true)
    }

    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    /// Remove and return every tracked handle.
    pub fn drain(&mut self) -> Vec<ProcessHandle> {
        std::mem::take(&mut self.tracked)
    }
}
