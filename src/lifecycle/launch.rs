//! Spawning services with an immediate liveness check.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::{
    EnvironmentOverlay, ExitInfo, ProcessHandle, ServiceKind, ServiceSpec, SupervisorState,
};
use crate::lifecycle::shutdown::{next_signal, ShutdownSignal};

/// Result of launching one service, kept for the readiness summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub name: String,
    pub port: u16,
    pub kind: ServiceKind,
    pub log_path: PathBuf,
    /// PID when the process survived its grace window.
    pub pid: Option<u32>,
    /// Why it is not running, when it is not.
    pub failure: Option<String>,
}

impl LaunchReport {
    #[must_use]
    pub fn started(&self) -> bool {
        self.failure.is_none()
    }
}

/// Outcome of launching a list of services that may be cut short.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchBatch {
    pub reports: Vec<LaunchReport>,
    /// The signal that stopped the batch early, if any.
    pub interrupted: Option<ShutdownSignal>,
}

/// Starts services with output redirected to per-service log sinks.
#[derive(Debug, Clone)]
pub struct ServiceLauncher {
    log_dir: PathBuf,
}

impl ServiceLauncher {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    #[must_use]
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Spawn `spec`, wait `grace`, and return a handle if it is still running.
    ///
    /// Combined stdout/stderr is appended to the service's log sink, which
    /// also receives a line describing any spawn failure.
    pub async fn launch(
        &self,
        spec: &ServiceSpec,
        overlay: &EnvironmentOverlay,
        grace: Duration,
    ) -> Option<ProcessHandle> {
        self.try_launch(spec, overlay, grace).await.ok()
    }

    /// Like [`launch`](Self::launch) but says why a service did not start.
    pub async fn try_launch(
        &self,
        spec: &ServiceSpec,
        overlay: &EnvironmentOverlay,
        grace: Duration,
    ) -> Result<ProcessHandle, String> {
        let log_path = spec.log_path(&self.log_dir);
        let directive = spec.directive();

        let log = open_log_sink(&log_path).map_err(|e| {
            warn!(service = %spec.name(), log = %log_path.display(), error = %e, "Failed to open log sink");
            format!("cannot open log {}: {e}", log_path.display())
        })?;
        let stderr = log.try_clone().map_err(|e| e.to_string())?;

        let spawned = Command::new(directive.program())
            .args(directive.args())
            .current_dir(directive.workdir())
            .env_clear()
            .envs(overlay.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(stderr))
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                let reason = format!("failed to spawn `{directive}`: {e}");
                note_in_log(&log_path, &reason);
                warn!(service = %spec.name(), error = %e, "Failed to start service");
                return Err(reason);
            }
        };

        tokio::time::sleep(grace).await;

        match child.try_wait() {
            Ok(None) => {
                let handle = ProcessHandle::new(spec.name(), spec.kind(), log_path, Box::new(child));
                info!(service = %spec.name(), pid = ?handle.pid(), port = spec.port(), "Service started");
                Ok(handle)
            }
            Ok(Some(status)) => {
                let exit = ExitInfo::from(status);
                warn!(service = %spec.name(), %exit, log = %log_path.display(), "Service exited during startup");
                Err(format!("exited during startup ({exit})"))
            }
            Err(e) => {
                warn!(service = %spec.name(), error = %e, "Failed to query service status");
                Err(format!("status unknown: {e}"))
            }
        }
    }

    /// Launch `specs` strictly in order, pausing `stagger` after each, and
    /// track the ones that survive their grace window.
    pub async fn launch_all(
        &self,
        specs: &[ServiceSpec],
        overlay: &EnvironmentOverlay,
        grace: Duration,
        stagger: Duration,
        state: &mut SupervisorState,
    ) -> Vec<LaunchReport> {
        let (_sender, mut never) = mpsc::channel(1);
        self.launch_all_until(specs, overlay, grace, stagger, state, &mut never)
            .await
            .reports
    }

    /// Like [`launch_all`](Self::launch_all), but stops launching as soon as
    /// a shutdown signal arrives.
    ///
    /// The signal is checked before each launch and raced against the
    /// stagger pause. A launch already in its grace window is allowed to
    /// finish so its process is tracked and can be stopped.
    pub async fn launch_all_until(
        &self,
        specs: &[ServiceSpec],
        overlay: &EnvironmentOverlay,
        grace: Duration,
        stagger: Duration,
        state: &mut SupervisorState,
        shutdown: &mut mpsc::Receiver<ShutdownSignal>,
    ) -> LaunchBatch {
        let mut batch = LaunchBatch::default();
        for spec in specs {
            if let Ok(signal) = shutdown.try_recv() {
                batch.interrupted = Some(signal);
                break;
            }
            batch
                .reports
                .push(self.launch_tracked(spec, overlay, grace, state).await);

            tokio::select! {
                biased;
                signal = next_signal(shutdown) => {
                    batch.interrupted = Some(signal);
                    break;
                }
                () = tokio::time::sleep(stagger) => {}
            }
        }
        if let Some(signal) = batch.interrupted {
            info!(%signal, launched = batch.reports.len(), "Launch interrupted");
        }
        batch
    }

    /// Launch one service and track it if it started.
    pub async fn launch_tracked(
        &self,
        spec: &ServiceSpec,
        overlay: &EnvironmentOverlay,
        grace: Duration,
        state: &mut SupervisorState,
    ) -> LaunchReport {
        let mut report = LaunchReport {
            name: spec.name().to_string(),
            port: spec.port(),
            kind: spec.kind(),
            log_path: spec.log_path(&self.log_dir),
            pid: None,
            failure: None,
        };

        match self.try_launch(spec, overlay, grace).await {
            Ok(handle) => {
                report.pid = handle.pid();
                if let Err(mut rejected) = state.track(handle) {
                    warn!(service = %spec.name(), "Service already tracked, stopping duplicate");
                    if let Err(e) = rejected.terminate() {
                        warn!(service = %spec.name(), error = %e, "Failed to stop duplicate");
                    }
                    report.pid = None;
                    report.failure = Some("duplicate service name".to_string());
                }
            }
            Err(reason) => report.failure = Some(reason),
        }
        report
    }
}

fn open_log_sink(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn note_in_log(path: &Path, message: &str) {
    if let Ok(mut file) = open_log_sink(path) {
        let _ = writeln!(file, "stackup: {message}");
    }
}
