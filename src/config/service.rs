//! Service registry configuration.

use std::path::Path;

use serde::Deserialize;

use crate::domain::{LaunchDirective, ServiceSpec};

/// Placeholder replaced with the service name inside `command`.
const NAME_PLACEHOLDER: &str = "{name}";

/// One backend service in the ordered registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub port: u16,
    /// Argv used to start the service; `{name}` expands to the service name.
    #[serde(default = "default_service_command")]
    pub command: Vec<String>,
    /// Shell script in the backend directory that replaces `command` when present.
    #[serde(default)]
    pub script: Option<String>,
}

fn default_service_command() -> Vec<String> {
    [
        "node",
        "-r",
        "dotenv/config",
        "node_modules/.bin/ts-node-dev",
        "--respawn",
        "services/{name}/src/index.ts",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            command: default_service_command(),
            script: None,
        }
    }

    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    #[must_use]
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    /// Resolve this entry into a launchable spec rooted at `backend_dir`.
    ///
    /// Returns `None` only when the command is empty, which validation rejects.
    pub fn to_spec(&self, backend_dir: &Path) -> Option<ServiceSpec> {
        let script = self
            .script
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| backend_dir.join(s))
            .filter(|path| path.is_file());

        let directive = match script {
            Some(path) => LaunchDirective::new(
                "bash",
                [path.to_string_lossy().into_owned()],
                backend_dir,
            ),
            None => {
                let lowered = self.name.to_lowercase();
                let argv: Vec<String> = self
                    .command
                    .iter()
                    .map(|arg| arg.replace(NAME_PLACEHOLDER, &lowered))
                    .collect();
                LaunchDirective::from_argv(&argv, backend_dir)?
            }
        };

        Some(ServiceSpec::backend(&self.name, self.port, directive))
    }
}

pub(super) fn default_services() -> Vec<ServiceConfig> {
    vec![
        ServiceConfig::new("auth", 4000).with_script("start-auth-service.sh"),
        ServiceConfig::new("project", 4001),
        ServiceConfig::new("collab", 4002),
        ServiceConfig::new("file", 4003),
        ServiceConfig::new("ai", 4004),
    ]
}

/// The frontend development server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrontendConfig {
    #[serde(default = "default_frontend_enabled")]
    pub enabled: bool,
    #[serde(default = "default_frontend_name")]
    pub name: String,
    #[serde(default = "default_frontend_port")]
    pub port: u16,
    #[serde(default = "default_frontend_command")]
    pub command: Vec<String>,
    /// Liveness grace window for the frontend (milliseconds).
    #[serde(default = "default_frontend_grace_ms")]
    pub grace_ms: u64,
}

fn default_frontend_enabled() -> bool {
    true
}

fn default_frontend_name() -> String {
    "frontend".into()
}

fn default_frontend_port() -> u16 {
    3000
}

fn default_frontend_command() -> Vec<String> {
    vec!["npm".into(), "run".into(), "dev".into()]
}

fn default_frontend_grace_ms() -> u64 {
    2000
}

impl FrontendConfig {
    pub fn to_spec(&self, frontend_dir: &Path) -> Option<ServiceSpec> {
        let directive = LaunchDirective::from_argv(&self.command, frontend_dir)?;
        Some(ServiceSpec::frontend(&self.name, self.port, directive))
    }

    #[must_use]
    pub fn grace(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.grace_ms)
    }

    /// URL operators open in a browser.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            enabled: default_frontend_enabled(),
            name: default_frontend_name(),
            port: default_frontend_port(),
            command: default_frontend_command(),
            grace_ms: default_frontend_grace_ms(),
        }
    }
}
