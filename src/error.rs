use std::path::PathBuf;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors that abort a run before any process is spawned.
///
/// Everything the launcher can recover from is reported through an outcome
/// type instead (see `lifecycle`), so this enum stays small on purpose.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("missing required executables: {}", .0.join(", "))]
    MissingPrerequisites(Vec<String>),

    #[error("{label} directory not found: {}", path.display())]
    MissingDirectory { label: &'static str, path: PathBuf },

    #[error("dependency installation failed in {}: {reason}", dir.display())]
    InstallFailed { dir: PathBuf, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
