//! Handler for `stackup up`: the full lifecycle, then supervision.

use chrono::Local;

use crate::cli::command::UpArgs;
use crate::cli::output;
use crate::domain::SupervisorState;
use crate::error::{Error, Result};
use crate::lifecycle::shutdown::ContainerTeardown;
use crate::lifecycle::{
    listen_for_signals, next_signal, BuildOutcome, ContainerOutcome, HealthReport, HealthStatus,
    InstallOutcome, LaunchReport, Launcher, ProvisionOutcome, ShutdownCoordinator,
    ShutdownSignal, SkipReason, SupervisorEvent,
};

/// Execute `up`. Returns the exit code once supervision ends.
pub async fn execute(launcher: &Launcher, args: &UpArgs) -> Result<i32> {
    output::header(env!("CARGO_PKG_VERSION"));

    output::section("Prerequisites");
    let prerequisites = launcher.check_prerequisites().await;
    for tool in &prerequisites.found {
        let version = tool.version.as_deref().unwrap_or("version unknown");
        output::success(&format!("{} {}", tool.name, output::highlight(version)));
    }
    if !prerequisites.is_satisfied() {
        return Err(Error::MissingPrerequisites(prerequisites.missing));
    }
    launcher.check_directories()?;

    output::section("Environment");
    let provisioner = launcher.provisioner();
    match launcher.provision() {
        ProvisionOutcome::Exists => {
            output::success(&format!("Using {}", provisioner.file().display()));
        }
        ProvisionOutcome::Created => output::success(&format!(
            "Created {} from {}",
            provisioner.file().display(),
            provisioner.template().display()
        )),
        ProvisionOutcome::TemplateMissing => output::warning(&format!(
            "No {} and no template at {}; services may be misconfigured",
            provisioner.file().display(),
            provisioner.template().display()
        )),
        ProvisionOutcome::Failed(e) => output::warning(&format!(
            "Could not create {}: {e}",
            provisioner.file().display()
        )),
    }
    let overlay = launcher.overlay();

    output::section("Dependencies");
    for (workspace, outcome) in launcher.install().await? {
        match outcome {
            InstallOutcome::AlreadyInstalled => {
                output::success(&format!("{} up to date", workspace.display()));
            }
            InstallOutcome::Installed => {
                output::success(&format!("Installed dependencies in {}", workspace.display()));
            }
        }
    }

    output::section("Build");
    report_build(launcher, args).await;

    output::section("Containers");
    let mut state = SupervisorState::new();
    start_containers(launcher, args, &mut state).await;

    let mut signals = match listen_for_signals() {
        Ok(signals) => signals,
        Err(e) => {
            ShutdownCoordinator::new().shutdown(&mut state).await;
            return Err(e.into());
        }
    };

    output::section("Services");
    let batch = launcher
        .launch_services_until(&overlay, &mut state, &mut signals)
        .await;
    for report in &batch.reports {
        report_launch(report);
    }
    if let Some(signal) = batch.interrupted {
        return Ok(interrupt(launcher, signal, &mut state).await);
    }
    let mut launches = batch.reports;

    if let Ok(signal) = signals.try_recv() {
        return Ok(interrupt(launcher, signal, &mut state).await);
    }
    let frontend = launcher.launch_frontend(&overlay, &mut state).await;
    if let Some(report) = &frontend {
        report_launch(report);
    }

    let pb = output::spinner("Waiting for services to warm up");
    let warm_up = tokio::select! {
        biased;
        signal = next_signal(&mut signals) => Some(signal),
        () = launcher.warm_up() => None,
    };
    output::spinner_clear(&pb);
    if let Some(signal) = warm_up {
        return Ok(interrupt(launcher, signal, &mut state).await);
    }

    output::section("Health");
    let health = tokio::select! {
        biased;
        signal = next_signal(&mut signals) => {
            return Ok(interrupt(launcher, signal, &mut state).await);
        }
        health = launcher.check_health() => health,
    };
    let health = match health {
        Ok(health) => health,
        Err(e) => {
            ShutdownCoordinator::new().shutdown(&mut state).await;
            return Err(e);
        }
    };
    report_health(&health, &launches);

    if let Some(report) = frontend.clone() {
        launches.push(report);
    }
    report_summary(launcher, &launches, frontend.as_ref());

    let outcome = launcher
        .supervisor()
        .run(&mut state, &mut signals, report_event)
        .await;
    Ok(outcome.exit_code())
}

/// Stop everything started so far after a signal during startup.
async fn interrupt(launcher: &Launcher, signal: ShutdownSignal, state: &mut SupervisorState) -> i32 {
    launcher
        .supervisor()
        .interrupt(signal, state, report_event)
        .await
        .exit_code()
}

async fn report_build(launcher: &Launcher, args: &UpArgs) {
    if args.no_build {
        output::note(&BuildOutcome::Skipped.to_string());
        return;
    }

    let pb = output::spinner("Building shared packages");
    match launcher.build().await {
        BuildOutcome::Succeeded => output::spinner_success(&pb, "Shared packages built"),
        BuildOutcome::Skipped => {
            output::spinner_clear(&pb);
            output::note(&BuildOutcome::Skipped.to_string());
        }
        failed => {
            output::spinner_fail(&pb, &failed.to_string());
            output::note("Continuing; services may fail if they depend on the build");
        }
    }
}

async fn start_containers(launcher: &Launcher, args: &UpArgs, state: &mut SupervisorState) {
    let outcome = if args.no_containers {
        ContainerOutcome::Skipped(SkipReason::Disabled)
    } else {
        let pb = output::spinner("Starting container services");
        let outcome = launcher.start_containers().await;
        output::spinner_clear(&pb);
        outcome
    };

    match outcome {
        ContainerOutcome::Started(backend) => {
            output::success(&format!("Container services started with {}", backend.engine_name()));
            state.set_container_backend(backend);
        }
        ContainerOutcome::AlreadyRunning => output::success("Container services already running"),
        ContainerOutcome::Skipped(reason) => output::note(&format!("Skipped: {reason}")),
        ContainerOutcome::Failed(message) => {
            output::warning(&format!("Container services failed to start: {message}"));
        }
    }
}

fn report_launch(report: &LaunchReport) {
    match (&report.failure, report.pid) {
        (None, Some(pid)) => output::success(&format!(
            "{} on port {} (pid {pid})",
            report.name,
            output::highlight(report.port)
        )),
        (None, None) => output::success(&format!(
            "{} on port {}",
            report.name,
            output::highlight(report.port)
        )),
        (Some(reason), _) => {
            output::warning(&format!("{} failed to start: {reason}", report.name));
            output::hint(&format!("see {}", report.log_path.display()));
        }
    }
}

fn report_health(health: &HealthReport, launches: &[LaunchReport]) {
    for check in health.checks() {
        match check.status() {
            HealthStatus::Healthy => output::success(&format!("{} healthy", check.name())),
            HealthStatus::Unhealthy(reason) => {
                output::warning(&format!("{} not responding: {reason}", check.name()));
                if let Some(launch) = launches.iter().find(|l| l.name == check.name()) {
                    output::hint(&format!("check {}", launch.log_path.display()));
                }
            }
        }
    }
}

fn report_summary(launcher: &Launcher, launches: &[LaunchReport], frontend: Option<&LaunchReport>) {
    let config = launcher.config();
    let backends = launches
        .iter()
        .filter(|l| l.kind.is_backend() && l.started())
        .count();

    output::section("Ready");
    output::field("Backend", format!("{backends}/{} running", config.services.len()));
    let frontend_status = match frontend {
        Some(report) if report.started() => "running",
        Some(_) => "not running",
        None => "disabled",
    };
    output::field("Frontend", frontend_status);
    if config.frontend.enabled {
        output::field("URL", output::highlight(config.frontend.url()));
    }

    output::section("Logs");
    for launch in launches {
        output::field(&launch.name, launch.log_path.display());
    }

    output::note("");
    output::note("Press Ctrl+C to stop all services");
}

fn report_event(event: SupervisorEvent) {
    let now = Local::now().format("%H:%M:%S").to_string();
    match event {
        SupervisorEvent::Exited {
            name,
            exit,
            log_path,
            at,
        } => {
            let status = exit.map_or_else(|| "status unknown".to_string(), |e| e.to_string());
            output::event(
                &at.format("%H:%M:%S").to_string(),
                &name,
                &format!("stopped unexpectedly ({status})"),
            );
            output::hint(&format!("see {}", log_path.display()));
        }
        SupervisorEvent::AllStopped => output::event(&now, "stackup", "all services have stopped"),
        SupervisorEvent::ShutdownRequested(signal) => {
            output::event(&now, "stackup", &format!("received {signal}, shutting down"));
        }
        SupervisorEvent::ShutdownComplete(report) => {
            output::section("Shutdown");
            for name in &report.terminated {
                output::success(&format!("Stopped {name}"));
            }
            for (name, error) in &report.failed {
                output::warning(&format!("Could not stop {name}: {error}"));
            }
            match report.container {
                Some(ContainerTeardown::Stopped) => output::success("Stopped container services"),
                Some(ContainerTeardown::Failed(error)) => {
                    output::warning(&format!("Could not stop container services: {error}"));
                }
                None => {}
            }
        }
    }
}
