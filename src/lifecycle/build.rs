//! Best-effort shared-library build.

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use crate::config::BuildConfig;

/// Longest build diagnostic kept in a [`BuildOutcome::Failed`].
const MAX_DIAGNOSTIC_CHARS: usize = 200;

/// How the build went. None of these stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded,
    /// Non-zero exit or spawn failure, with a truncated diagnostic.
    Failed(String),
    TimedOut(Duration),
    /// Nothing to run, or disabled by the operator.
    Skipped,
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "built"),
            Self::Failed(reason) => write!(f, "build had issues: {reason}"),
            Self::TimedOut(after) => write!(f, "build timed out after {}s", after.as_secs()),
            Self::Skipped => write!(f, "build skipped"),
        }
    }
}

/// The command a build will run and how long it may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    pub argv: Vec<String>,
    pub timeout: Duration,
}

/// Triggers compilation of shared libraries.
#[derive(Debug, Clone)]
pub struct BuildInvoker {
    config: BuildConfig,
}

impl BuildInvoker {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Pick the build script if it exists in `workspace`, else the fallback.
    #[must_use]
    pub fn step(&self, workspace: &Path) -> Option<BuildStep> {
        let script = self
            .config
            .script
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| workspace.join(s))
            .filter(|path| path.is_file());

        if let Some(script) = script {
            return Some(BuildStep {
                argv: vec![
                    self.config.interpreter.clone(),
                    script.to_string_lossy().into_owned(),
                ],
                timeout: self.config.script_timeout(),
            });
        }

        if self.config.fallback.is_empty() {
            return None;
        }
        Some(BuildStep {
            argv: self.config.fallback.clone(),
            timeout: self.config.fallback_timeout(),
        })
    }

    /// Build `workspace`. Never fails; every outcome is logged.
    pub async fn build(&self, workspace: &Path) -> BuildOutcome {
        match self.step(workspace) {
            Some(step) => run_build(workspace, &step.argv, step.timeout).await,
            None => BuildOutcome::Skipped,
        }
    }
}

/// Run `argv` in `workspace`, waiting at most `timeout`.
///
/// A build still running at the deadline is killed.
pub async fn run_build(workspace: &Path, argv: &[String], timeout: Duration) -> BuildOutcome {
    let Some((program, args)) = argv.split_first() else {
        return BuildOutcome::Skipped;
    };

    info!(workspace = %workspace.display(), command = ?argv, timeout_secs = timeout.as_secs(), "Building");
    let output = Command::new(program)
        .args(args)
        .current_dir(workspace)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let outcome = match tokio::time::timeout(timeout, output).await {
        Err(_) => BuildOutcome::TimedOut(timeout),
        Ok(Err(e)) => BuildOutcome::Failed(truncate(&e.to_string())),
        Ok(Ok(output)) if output.status.success() => BuildOutcome::Succeeded,
        Ok(Ok(output)) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            };
            BuildOutcome::Failed(truncate(&detail))
        }
    };

    match &outcome {
        BuildOutcome::Succeeded => info!("Build succeeded"),
        other => warn!(outcome = %other, "Build did not succeed, continuing"),
    }
    outcome
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_DIAGNOSTIC_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[tokio::test]
    async fn success_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run_build(dir.path(), &sh("exit 0"), Duration::from_secs(5)).await;
        assert_eq!(outcome, BuildOutcome::Succeeded);
    }

    #[tokio::test]
    async fn failure_carries_truncated_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = "printf '%0300d' 0 >&2; exit 2";
        let outcome = run_build(dir.path(), &sh(script), Duration::from_secs(5)).await;

        match outcome {
            BuildOutcome::Failed(reason) => assert_eq!(reason.chars().count(), 200),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_build_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run_build(dir.path(), &sh("sleep 5"), Duration::from_millis(100)).await;
        assert_eq!(outcome, BuildOutcome::TimedOut(Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn unspawnable_build_is_a_failure_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let argv = vec!["stackup-no-such-build-tool".to_string()];
        let outcome = run_build(dir.path(), &argv, Duration::from_secs(1)).await;
        assert!(matches!(outcome, BuildOutcome::Failed(_)));
    }

    #[test]
    fn script_takes_precedence_over_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = BuildInvoker::new(BuildConfig::default());

        let fallback = invoker.step(dir.path()).unwrap();
        assert_eq!(fallback.argv, vec!["npm", "run", "build"]);
        assert_eq!(fallback.timeout, Duration::from_secs(60));

        std::fs::write(dir.path().join("build-packages.py"), "").unwrap();
        let script = invoker.step(dir.path()).unwrap();
        assert_eq!(script.argv[0], "python3");
        assert!(script.argv[1].ends_with("build-packages.py"));
        assert_eq!(script.timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn nothing_to_run_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = BuildInvoker::new(BuildConfig {
            script: None,
            fallback: vec![],
            ..BuildConfig::default()
        });
        assert_eq!(invoker.build(dir.path()).await, BuildOutcome::Skipped);
    }
}
