//! Launcher configuration.
//!
//! Provides the main [`Config`] struct. Every field has a default, and a
//! missing config file means "use the defaults", so a bare project with
//! `backend/` and `frontend/` directories starts without any configuration.
//!
//! # Example
//!
//! ```no_run
//! use stackup::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default("stackup.toml")?;
//!     config.logging.init();
//!     Ok(())
//! }
//! ```

mod logging;
mod service;
mod timing;
mod toolchain;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::ServiceSpec;
use crate::error::{ConfigError, Result};

pub use logging::LoggingConfig;
pub use service::{FrontendConfig, ServiceConfig};
pub use timing::TimingConfig;
pub use toolchain::{BuildConfig, ContainersConfig, InstallConfig, Prerequisite};

/// Project layout relative to the root directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_backend_dir")]
    pub backend_dir: PathBuf,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: PathBuf,
}

fn default_backend_dir() -> PathBuf {
    PathBuf::from("backend")
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from("frontend")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            backend_dir: default_backend_dir(),
            frontend_dir: default_frontend_dir(),
        }
    }
}

/// Environment file handed to every service, relative to the backend directory.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_env_file")]
    pub file: String,
    /// Copied to `file` when `file` does not exist.
    #[serde(default = "default_env_template")]
    pub template: String,
}

fn default_env_file() -> String {
    ".env".into()
}

fn default_env_template() -> String {
    "example.env".into()
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            file: default_env_file(),
            template: default_env_template(),
        }
    }
}

/// Where per-service log sinks live.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsConfig {
    /// Defaults to the OS temp directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl LogsConfig {
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Main launcher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Executables checked before anything else happens.
    #[serde(default = "toolchain::default_prerequisites")]
    pub prerequisites: Vec<Prerequisite>,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub containers: ContainersConfig,

    /// Backend services, launched in this order.
    #[serde(default = "service::default_services")]
    pub services: Vec<ServiceConfig>,

    #[serde(default)]
    pub frontend: FrontendConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub logs: LogsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            environment: EnvironmentConfig::default(),
            prerequisites: toolchain::default_prerequisites(),
            install: InstallConfig::default(),
            build: BuildConfig::default(),
            containers: ContainersConfig::default(),
            services: service::default_services(),
            frontend: FrontendConfig::default(),
            timing: TimingConfig::default(),
            logs: LogsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.services.is_empty() {
            return Err(ConfigError::MissingField { field: "services" }.into());
        }

        let mut names = HashSet::new();
        let mut ports = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "services.name",
                    reason: "must not be empty".to_string(),
                }
                .into());
            }
            if !names.insert(service.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "services.name",
                    reason: format!("duplicate service '{}'", service.name),
                }
                .into());
            }
            if service.command.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "services.command",
                    reason: format!("service '{}' has an empty command", service.name),
                }
                .into());
            }
            Self::check_port(&mut ports, &service.name, service.port)?;
        }

        if self.frontend.enabled {
            if self.frontend.command.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "frontend.command",
                    reason: "must not be empty".to_string(),
                }
                .into());
            }
            if names.contains(self.frontend.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "frontend.name",
                    reason: format!("'{}' is already a service name", self.frontend.name),
                }
                .into());
            }
            Self::check_port(&mut ports, &self.frontend.name, self.frontend.port)?;
        }

        if self.install.command.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "install.command",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if self.timing.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timing.tick_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn check_port(seen: &mut HashSet<u16>, name: &str, port: u16) -> Result<()> {
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port",
                reason: format!("'{name}' has port 0"),
            }
            .into());
        }
        if !seen.insert(port) {
            return Err(ConfigError::InvalidValue {
                field: "port",
                reason: format!("port {port} of '{name}' is already taken"),
            }
            .into());
        }
        Ok(())
    }

    #[must_use]
    pub fn backend_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.project.backend_dir)
    }

    #[must_use]
    pub fn frontend_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.project.frontend_dir)
    }

    /// Ordered backend specs resolved against `root`.
    #[must_use]
    pub fn service_specs(&self, root: &Path) -> Vec<ServiceSpec> {
        let backend = self.backend_dir(root);
        self.services
            .iter()
            .filter_map(|service| service.to_spec(&backend))
            .collect()
    }

    /// Frontend spec resolved against `root`, if the frontend is enabled.
    #[must_use]
    pub fn frontend_spec(&self, root: &Path) -> Option<ServiceSpec> {
        if !self.frontend.enabled {
            return None;
        }
        self.frontend.to_spec(&self.frontend_dir(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.services.len(), 5);
        assert_eq!(config.frontend.port, 3000);
        assert_eq!(config.timing.tick_ms, 5000);
        assert_eq!(config.environment.file, ".env");
        assert_eq!(config.prerequisites.len(), 2);
    }

    #[test]
    fn shipped_template_matches_defaults() {
        let config = Config::parse_toml(include_str!("../../stackup.toml.example")).unwrap();
        let defaults = Config::default();

        let names: Vec<_> = config.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["auth", "project", "collab", "file", "ai"]);
        assert_eq!(config.services[0].script.as_deref(), Some("start-auth-service.sh"));
        assert_eq!(config.services[1].command, defaults.services[1].command);
        assert_eq!(config.frontend, defaults.frontend);
        assert_eq!(config.build.script, defaults.build.script);
        assert_eq!(config.timing.tick_ms, defaults.timing.tick_ms);
        assert!(config.logs.dir.is_none());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = Config::parse_toml(
            r#"
            [timing]
            grace_ms = 50

            [containers]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.timing.grace_ms, 50);
        assert_eq!(config.timing.stagger_ms, 500);
        assert!(!config.containers.enabled);
        assert_eq!(config.containers.engine, "docker-compose");
    }

    #[test]
    fn services_replace_the_default_registry() {
        let config = Config::parse_toml(
            r#"
            [[services]]
            name = "a"
            port = 4000
            command = ["sleep", "30"]

            [[services]]
            name = "b"
            port = 4001
            "#,
        )
        .unwrap();

        assert_eq!(config.services.len(), 2);
        assert_eq!(config.services[0].command, vec!["sleep", "30"]);
        assert_eq!(config.services[1].command[0], "node");
    }

    #[test]
    fn duplicate_ports_are_rejected() {
        let result = Config::parse_toml(
            r#"
            [[services]]
            name = "a"
            port = 4000

            [[services]]
            name = "b"
            port = 4000
            "#,
        );
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { field: "port", .. }))
        ));
    }

    #[test]
    fn frontend_port_collision_is_rejected() {
        let result = Config::parse_toml(
            r#"
            [[services]]
            name = "a"
            port = 3000
            "#,
        );
        assert!(result.is_err());

        let ok = Config::parse_toml(
            r#"
            [[services]]
            name = "a"
            port = 3000

            [frontend]
            enabled = false
            "#,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = Config::parse_toml(
            r#"
            [[services]]
            name = "a"
            port = 4000

            [[services]]
            name = "a"
            port = 4001
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn zero_tick_is_rejected() {
        let result = Config::parse_toml("[timing]\ntick_ms = 0\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "timing.tick_ms",
                ..
            }))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = Config::parse_toml("[[services]\nname=");
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("stackup.toml")).unwrap();
        assert_eq!(config.services.len(), 5);
    }

    #[test]
    fn specs_resolve_against_root() {
        let config = Config::default();
        let root = Path::new("/srv/app");
        let specs = config.service_specs(root);

        assert_eq!(specs.len(), 5);
        assert_eq!(specs[0].name(), "auth");
        assert_eq!(specs[0].directive().workdir(), Path::new("/srv/app/backend"));

        let frontend = config.frontend_spec(root).unwrap();
        assert_eq!(frontend.directive().workdir(), Path::new("/srv/app/frontend"));
        assert_eq!(frontend.directive().to_string(), "npm run dev");
    }
}
