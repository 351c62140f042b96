//! The startup pipeline and the supervision that follows it.
//!
//! Each submodule owns one phase. [`Launcher`] binds them to a [`Config`] and
//! a project root so the CLI can drive the phases in order:
//!
//! 1. prerequisites and project directories (no side effects)
//! 2. environment file provisioning
//! 3. dependency installation
//! 4. shared-library build
//! 5. container services
//! 6. backend services, then the frontend
//! 7. warm-up and health probing
//! 8. supervision until every process exits or a signal arrives

pub mod build;
pub mod container;
pub mod env;
pub mod health;
pub mod install;
pub mod launch;
pub mod prereq;
pub mod shutdown;
pub mod supervisor;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::adapter::ComposeCli;
use crate::config::Config;
use crate::domain::{EnvironmentOverlay, SupervisorState};
use crate::error::{Error, Result};
use crate::port::ContainerEngine;

pub use build::{BuildInvoker, BuildOutcome};
pub use container::{ContainerBackendStarter, ContainerOutcome, SkipReason};
pub use env::{parse_env, EnvironmentProvisioner, ProvisionOutcome};
pub use health::{HealthCheck, HealthProber, HealthReport, HealthStatus};
pub use install::{DependencyInstaller, InstallOutcome};
pub use launch::{LaunchBatch, LaunchReport, ServiceLauncher};
pub use prereq::{FoundTool, PrerequisiteChecker, PrerequisiteReport};
pub use shutdown::{
    listen_for_signals, next_signal, ShutdownCoordinator, ShutdownReport, ShutdownSignal,
};
pub use supervisor::{Supervisor, SupervisorEvent, SupervisorOutcome};

/// Runs the lifecycle phases for one project.
#[derive(Debug, Clone)]
pub struct Launcher {
    config: Config,
    root: PathBuf,
}

impl Launcher {
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn backend_dir(&self) -> PathBuf {
        self.config.backend_dir(&self.root)
    }

    #[must_use]
    pub fn frontend_dir(&self) -> PathBuf {
        self.config.frontend_dir(&self.root)
    }

    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.config.logs.dir()
    }

    /// Look up every configured prerequisite.
    pub async fn check_prerequisites(&self) -> PrerequisiteReport {
        PrerequisiteChecker::new()
            .check(&self.config.prerequisites)
            .await
    }

    /// Verify the project directories exist.
    ///
    /// The frontend directory is only required when the frontend is enabled.
    pub fn check_directories(&self) -> Result<()> {
        let backend = self.backend_dir();
        if !backend.is_dir() {
            return Err(Error::MissingDirectory {
                label: "backend",
                path: backend,
            });
        }
        if self.config.frontend.enabled {
            let frontend = self.frontend_dir();
            if !frontend.is_dir() {
                return Err(Error::MissingDirectory {
                    label: "frontend",
                    path: frontend,
                });
            }
        }
        Ok(())
    }

    /// Prerequisites and directories. Nothing has been touched if this fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPrerequisites`] naming every missing executable,
    /// or [`Error::MissingDirectory`].
    pub async fn preflight(&self) -> Result<PrerequisiteReport> {
        let report = self.check_prerequisites().await;
        if !report.is_satisfied() {
            return Err(Error::MissingPrerequisites(report.missing));
        }
        self.check_directories()?;
        Ok(report)
    }

    pub fn provisioner(&self) -> EnvironmentProvisioner {
        let backend = self.backend_dir();
        EnvironmentProvisioner::new(
            backend.join(&self.config.environment.file),
            backend.join(&self.config.environment.template),
        )
    }

    /// Make sure the services' environment file exists.
    pub fn provision(&self) -> ProvisionOutcome {
        self.provisioner().ensure_config()
    }

    /// Environment handed to every spawned process.
    pub fn overlay(&self) -> EnvironmentOverlay {
        self.provisioner().load_overlay()
    }

    /// Install backend then frontend dependencies where missing.
    ///
    /// # Errors
    ///
    /// Stops at the first workspace whose install fails.
    pub async fn install(&self) -> Result<Vec<(PathBuf, InstallOutcome)>> {
        let installer =
            DependencyInstaller::new(&self.config.install.marker, self.config.install.command.clone());

        let mut workspaces = vec![self.backend_dir()];
        if self.config.frontend.enabled {
            workspaces.push(self.frontend_dir());
        }

        let mut outcomes = Vec::with_capacity(workspaces.len());
        for workspace in workspaces {
            let outcome = installer.ensure_installed(&workspace).await?;
            debug!(workspace = %workspace.display(), ?outcome, "Dependencies checked");
            outcomes.push((workspace, outcome));
        }
        Ok(outcomes)
    }

    /// Build the shared libraries. Never fatal.
    pub async fn build(&self) -> BuildOutcome {
        BuildInvoker::new(self.config.build.clone())
            .build(&self.backend_dir())
            .await
    }

    /// The configured compose-style engine.
    pub fn container_engine(&self) -> Arc<dyn ContainerEngine> {
        Arc::new(ComposeCli::new(
            &self.config.containers.engine,
            self.config.containers.requires.clone(),
        ))
    }

    /// Start container services with the configured engine. Never fatal.
    pub async fn start_containers(&self) -> ContainerOutcome {
        self.start_containers_with(self.container_engine()).await
    }

    /// Start container services with `engine`.
    pub async fn start_containers_with(&self, engine: Arc<dyn ContainerEngine>) -> ContainerOutcome {
        if !self.config.containers.enabled {
            return ContainerOutcome::Skipped(SkipReason::Disabled);
        }
        ContainerBackendStarter::new(
            engine,
            &self.config.containers.descriptor,
            self.config.containers.settle(),
        )
        .start(&self.backend_dir())
        .await
    }

    /// Launch every backend service in declaration order.
    ///
    /// Survivors are tracked in `state`; the rest are only reported.
    pub async fn launch_services(
        &self,
        overlay: &EnvironmentOverlay,
        state: &mut SupervisorState,
    ) -> Vec<LaunchReport> {
        let specs = self.config.service_specs(&self.root);
        info!(count = specs.len(), "Launching backend services");
        ServiceLauncher::new(self.log_dir())
            .launch_all(
                &specs,
                overlay,
                self.config.timing.grace(),
                self.config.timing.stagger(),
                state,
            )
            .await
    }

    /// Launch backend services until done or until a signal arrives on
    /// `signals`. Services already tracked stay in `state` for shutdown.
    pub async fn launch_services_until(
        &self,
        overlay: &EnvironmentOverlay,
        state: &mut SupervisorState,
        signals: &mut mpsc::Receiver<ShutdownSignal>,
    ) -> LaunchBatch {
        let specs = self.config.service_specs(&self.root);
        info!(count = specs.len(), "Launching backend services");
        ServiceLauncher::new(self.log_dir())
            .launch_all_until(
                &specs,
                overlay,
                self.config.timing.grace(),
                self.config.timing.stagger(),
                state,
                signals,
            )
            .await
    }

    /// Launch the frontend dev server, if enabled.
    pub async fn launch_frontend(
        &self,
        overlay: &EnvironmentOverlay,
        state: &mut SupervisorState,
    ) -> Option<LaunchReport> {
        let spec = self.config.frontend_spec(&self.root)?;
        let report = ServiceLauncher::new(self.log_dir())
            .launch_tracked(&spec, overlay, self.config.frontend.grace(), state)
            .await;
        Some(report)
    }

    /// Wait for services to warm up.
    pub async fn warm_up(&self) {
        tokio::time::sleep(self.config.timing.warmup()).await;
    }

    /// Probe the health endpoint of every declared backend service.
    ///
    /// # Errors
    ///
    /// Only fails if the HTTP client cannot be built.
    pub async fn check_health(&self) -> Result<HealthReport> {
        let prober = HealthProber::new(self.config.timing.health_timeout())?;
        Ok(prober.report(&self.config.service_specs(&self.root)).await)
    }

    pub fn supervisor(&self) -> Supervisor {
        Supervisor::new(self.config.timing.tick())
    }
}
