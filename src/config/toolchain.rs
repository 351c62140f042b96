//! External tooling the launcher shells out to.

use std::time::Duration;

use serde::Deserialize;

/// An executable that must be on `PATH` before anything is started.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Prerequisite {
    /// Executable looked up on `PATH`.
    pub command: String,
    /// Human-readable name used in reports.
    pub name: String,
}

impl Prerequisite {
    pub fn new(command: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            name: name.into(),
        }
    }
}

pub(super) fn default_prerequisites() -> Vec<Prerequisite> {
    vec![
        Prerequisite::new("node", "Node.js"),
        Prerequisite::new("npm", "npm"),
    ]
}

/// First-run dependency installation.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallConfig {
    /// Directory whose presence means dependencies are installed.
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Installer command, run in each workspace lacking the marker.
    #[serde(default = "default_install_command")]
    pub command: Vec<String>,
}

fn default_marker() -> String {
    "node_modules".into()
}

fn default_install_command() -> Vec<String> {
    vec!["npm".into(), "install".into()]
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            command: default_install_command(),
        }
    }
}

/// Shared-library build step.
///
/// If `script` exists in the backend directory it is run through
/// `interpreter`; otherwise `fallback` is run.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_script")]
    pub script: Option<String>,
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default = "default_script_timeout_secs")]
    pub script_timeout_secs: u64,
    #[serde(default = "default_fallback")]
    pub fallback: Vec<String>,
    #[serde(default = "default_fallback_timeout_secs")]
    pub fallback_timeout_secs: u64,
}

fn default_script() -> Option<String> {
    Some("build-packages.py".into())
}

fn default_interpreter() -> String {
    "python3".into()
}

fn default_script_timeout_secs() -> u64 {
    120
}

fn default_fallback() -> Vec<String> {
    vec!["npm".into(), "run".into(), "build".into()]
}

fn default_fallback_timeout_secs() -> u64 {
    60
}

impl BuildConfig {
    #[must_use]
    pub fn script_timeout(&self) -> Duration {
        Duration::from_secs(self.script_timeout_secs)
    }

    #[must_use]
    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_secs(self.fallback_timeout_secs)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            script: default_script(),
            interpreter: default_interpreter(),
            script_timeout_secs: default_script_timeout_secs(),
            fallback: default_fallback(),
            fallback_timeout_secs: default_fallback_timeout_secs(),
        }
    }
}

/// Containerized auxiliary services (database, cache).
#[derive(Debug, Clone, Deserialize)]
pub struct ContainersConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Compose-style CLI used for `ps`, `up` and `down`.
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Executables that must all be present for the engine to be usable.
    #[serde(default = "default_requires")]
    pub requires: Vec<String>,
    /// Descriptor file in the backend directory.
    #[serde(default = "default_descriptor")]
    pub descriptor: String,
    /// Wait after a successful start (seconds).
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_engine() -> String {
    "docker-compose".into()
}

fn default_requires() -> Vec<String> {
    vec!["docker".into(), "docker-compose".into()]
}

fn default_descriptor() -> String {
    "docker-compose.yml".into()
}

fn default_settle_secs() -> u64 {
    5
}

impl ContainersConfig {
    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

impl Default for ContainersConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            engine: default_engine(),
            requires: default_requires(),
            descriptor: default_descriptor(),
            settle_secs: default_settle_secs(),
        }
    }
}
