//! The long-running reconciliation loop.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::domain::{ExitInfo, SupervisorState};
use crate::lifecycle::shutdown::{ShutdownCoordinator, ShutdownReport, ShutdownSignal};

/// Something operators should hear about while supervising.
#[derive(Debug, Clone, PartialEq)]
pub enum SupervisorEvent {
    /// A tracked process was found exited and is no longer supervised.
    Exited {
        name: String,
        /// `None` when the status could not be read.
        exit: Option<ExitInfo>,
        log_path: PathBuf,
        at: DateTime<Local>,
    },
    /// The last tracked process is gone.
    AllStopped,
    ShutdownRequested(ShutdownSignal),
    ShutdownComplete(ShutdownReport),
}

/// How supervision ended. Both outcomes exit with status 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorOutcome {
    AllStopped,
    ShutDown(ShutdownReport),
}

impl SupervisorOutcome {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        0
    }
}

/// Polls tracked processes every tick until none remain or shutdown is signalled.
///
/// Dead processes are dropped, never restarted.
#[derive(Debug, Clone)]
pub struct Supervisor {
    period: Duration,
    coordinator: ShutdownCoordinator,
}

impl Supervisor {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            coordinator: ShutdownCoordinator::new(),
        }
    }

    /// One reconciliation pass: remove and report every exited process.
    ///
    /// Afterwards `state` holds only processes confirmed alive by this pass.
    pub fn tick(&self, state: &mut SupervisorState) -> Vec<SupervisorEvent> {
        let at = Local::now();
        state
            .reap_exited()
            .into_iter()
            .map(|handle| {
                match handle.exit() {
                    Some(exit) => warn!(service = %handle.name(), %exit, "Service stopped unexpectedly"),
                    None => warn!(service = %handle.name(), "Service status unknown, no longer supervised"),
                }
                SupervisorEvent::Exited {
                    name: handle.name().to_string(),
                    exit: handle.exit(),
                    log_path: handle.log_path().to_path_buf(),
                    at,
                }
            })
            .collect()
    }

    /// Run shutdown for `signal` to completion, reporting both ends of it.
    ///
    /// Also used when a signal arrives before supervision has started. A
    /// repeated call finds shutdown already done and reports an empty run.
    pub async fn interrupt<F>(
        &self,
        signal: ShutdownSignal,
        state: &mut SupervisorState,
        mut on_event: F,
    ) -> SupervisorOutcome
    where
        F: FnMut(SupervisorEvent),
    {
        on_event(SupervisorEvent::ShutdownRequested(signal));
        let report = self.coordinator.shutdown(state).await.unwrap_or_default();
        on_event(SupervisorEvent::ShutdownComplete(report.clone()));
        SupervisorOutcome::ShutDown(report)
    }

    /// Supervise until every process has exited or a shutdown signal arrives.
    ///
    /// The first tick runs immediately, so an empty state ends at once. A
    /// signal preempts the tick and runs the shutdown coordinator to completion
    /// before returning.
    pub async fn run<F>(
        &self,
        state: &mut SupervisorState,
        shutdown: &mut mpsc::Receiver<ShutdownSignal>,
        mut on_event: F,
    ) -> SupervisorOutcome
    where
        F: FnMut(SupervisorEvent),
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut signals_open = true;

        info!(tracked = state.len(), tick_ms = self.period.as_millis() as u64, "Supervising");
        loop {
            tokio::select! {
                biased;

                received = shutdown.recv(), if signals_open => {
                    let Some(signal) = received else {
                        signals_open = false;
                        continue;
                    };
                    return self.interrupt(signal, state, &mut on_event).await;
                }

                _ = interval.tick() => {
                    for event in self.tick(state) {
                        on_event(event);
                    }
                    if state.is_empty() {
                        info!("All supervised processes have stopped");
                        on_event(SupervisorEvent::AllStopped);
                        return SupervisorOutcome::AllStopped;
                    }
                }
            }
        }
    }
}
