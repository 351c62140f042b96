//! Signal-triggered graceful shutdown.

use std::fmt;
use std::io;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::SupervisorState;

/// Which operator signal asked for shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// What happened to the container backend at shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerTeardown {
    Stopped,
    Failed(String),
}

/// Everything the coordinator did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Processes sent a termination request, in tracking order.
    pub terminated: Vec<String>,
    /// Processes whose termination request failed, with the error.
    pub failed: Vec<(String, String)>,
    /// `None` when this run did not start a container backend.
    pub container: Option<ContainerTeardown>,
}

/// Stops every tracked process and any container backend this run started.
#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator;

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self
    }

    /// Run shutdown to completion.
    ///
    /// Only the first call does anything; later calls return `None`.
    /// A failed termination request is recorded and the remaining processes
    /// are still signalled.
    pub async fn shutdown(&self, state: &mut SupervisorState) -> Option<ShutdownReport> {
        if !state.begin_shutdown() {
            debug!("Shutdown already in progress");
            return None;
        }

        let mut report = ShutdownReport::default();
        for mut handle in state.drain() {
            match handle.terminate() {
                Ok(()) => {
                    debug!(service = %handle.name(), pid = ?handle.pid(), "Termination requested");
                    report.terminated.push(handle.name().to_string());
                }
                Err(e) => {
                    warn!(service = %handle.name(), error = %e, "Failed to terminate process");
                    report.failed.push((handle.name().to_string(), e.to_string()));
                }
            }
        }

        if let Some(backend) = state.take_container_backend() {
            report.container = Some(match backend.teardown().await {
                Ok(()) => ContainerTeardown::Stopped,
                Err(e) => {
                    warn!(engine = %backend.engine_name(), error = %e, "Failed to stop container services");
                    ContainerTeardown::Failed(e.to_string())
                }
            });
        }

        info!(
            terminated = report.terminated.len(),
            failed = report.failed.len(),
            "Shutdown complete"
        );
        Some(report)
    }
}

/// Forward SIGINT/SIGTERM into a channel the supervisor selects on.
///
/// Every delivered signal is forwarded; the coordinator acts on the first.
pub fn listen_for_signals() -> io::Result<mpsc::Receiver<ShutdownSignal>> {
    let (tx, rx) = mpsc::channel(4);
    spawn_forwarder(tx)?;
    Ok(rx)
}

/// Wait for the next forwarded signal.
///
/// A closed channel never yields, so callers can race this against other work
/// without special-casing a missing forwarder.
pub async fn next_signal(signals: &mut mpsc::Receiver<ShutdownSignal>) -> ShutdownSignal {
    match signals.recv().await {
        Some(signal) => signal,
        None => std::future::pending().await,
    }
}

#[cfg(unix)]
fn spawn_forwarder(tx: mpsc::Sender<ShutdownSignal>) -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => ShutdownSignal::Interrupt,
                Some(()) = terminate.recv() => ShutdownSignal::Terminate,
                else => break,
            };
            info!(signal = %received, "Shutdown signal received");
            if tx.send(received).await.is_err() {
                break;
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn spawn_forwarder(tx: mpsc::Sender<ShutdownSignal>) -> io::Result<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            if tx.send(ShutdownSignal::Interrupt).await.is_err() {
                break;
            }
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{ContainerBackend, ExitInfo, ProcessHandle, ServiceKind};
    use crate::port::{ContainerEngine, EngineOutput, ManagedProcess};

    struct Counted {
        terminations: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ManagedProcess for Counted {
        fn id(&self) -> Option<u32> {
            Some(1)
        }

        fn try_exit(&mut self) -> io::Result<Option<ExitInfo>> {
            Ok(None)
        }

        fn terminate(&mut self) -> io::Result<()> {
            self.terminations.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(io::Error::other("stuck"))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct Compose {
        downs: AtomicUsize,
    }

    #[async_trait]
    impl ContainerEngine for Compose {
        fn name(&self) -> &str {
            "compose"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn running(&self, _: &Path) -> io::Result<bool> {
            Ok(false)
        }

        async fn up(&self, _: &Path) -> io::Result<EngineOutput> {
            Ok(EngineOutput {
                success: true,
                message: String::new(),
            })
        }

        async fn down(&self, _: &Path) -> io::Result<()> {
            self.downs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn track(state: &mut SupervisorState, name: &str, fail: bool) -> Arc<AtomicUsize> {
        let terminations = Arc::new(AtomicUsize::new(0));
        let process = Counted {
            terminations: terminations.clone(),
            fail,
        };
        state
            .track(ProcessHandle::new(
                name,
                ServiceKind::Backend,
                format!("/tmp/{name}-service.log"),
                Box::new(process),
            ))
            .unwrap();
        terminations
    }

    #[tokio::test]
    async fn second_invocation_is_a_no_op() {
        let mut state = SupervisorState::new();
        let a = track(&mut state, "a", false);
        let b = track(&mut state, "b", false);
        let coordinator = ShutdownCoordinator::new();

        let first = coordinator.shutdown(&mut state).await;
        let second = coordinator.shutdown(&mut state).await;

        assert_eq!(first.unwrap().terminated, vec!["a", "b"]);
        assert!(second.is_none());
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn one_stuck_process_does_not_block_the_rest() {
        let mut state = SupervisorState::new();
        let stuck = track(&mut state, "stuck", true);
        let fine = track(&mut state, "fine", false);

        let report = ShutdownCoordinator::new().shutdown(&mut state).await.unwrap();

        assert_eq!(stuck.load(Ordering::SeqCst), 1);
        assert_eq!(fine.load(Ordering::SeqCst), 1);
        assert_eq!(report.terminated, vec!["fine"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "stuck");
    }

    #[tokio::test]
    async fn started_container_backend_is_torn_down() {
        let mut state = SupervisorState::new();
        track(&mut state, "a", false);
        let engine = Arc::new(Compose::default());
        state.set_container_backend(ContainerBackend::new(engine.clone(), "/srv/backend"));

        let report = ShutdownCoordinator::new().shutdown(&mut state).await.unwrap();

        assert_eq!(report.container, Some(ContainerTeardown::Stopped));
        assert_eq!(engine.downs.load(Ordering::SeqCst), 1);
        assert!(state.container_backend().is_none());
    }

    #[tokio::test]
    async fn closed_channel_never_yields_a_signal() {
        let (tx, mut rx) = mpsc::channel(1);
        drop(tx);

        let waited = tokio::time::timeout(Duration::from_millis(50), next_signal(&mut rx)).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn queued_signal_is_returned() {
        let (tx, mut rx) = mpsc::channel(1);
        tx.send(ShutdownSignal::Terminate).await.unwrap();
        assert_eq!(next_signal(&mut rx).await, ShutdownSignal::Terminate);
    }

    #[tokio::test]
    async fn no_backend_means_no_teardown() {
        let mut state = SupervisorState::new();
        let report = ShutdownCoordinator::new().shutdown(&mut state).await.unwrap();
        assert_eq!(report.container, None);
        assert!(report.terminated.is_empty());
    }
}
