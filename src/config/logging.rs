//! Logging configuration and initialization.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration.
///
/// Diagnostics go to stderr; stdout is reserved for the operator report.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "warn".into()
}

fn default_format() -> String {
    "pretty".into()
}

impl LoggingConfig {
    /// Raise the level for each `-v` given on the command line.
    pub fn apply_verbosity(&mut self, verbose: u8) {
        match verbose {
            0 => {}
            1 => self.level = "info".into(),
            _ => self.level = "debug".into(),
        }
    }

    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured level.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let result = match self.format.as_str() {
            "json" => fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            _ => fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
        // A subscriber may already be installed (tests, embedding); keep it.
        let _ = result;
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        let mut config = LoggingConfig::default();
        config.apply_verbosity(0);
        assert_eq!(config.level, "warn");
        config.apply_verbosity(1);
        assert_eq!(config.level, "info");
        config.apply_verbosity(3);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn init_twice_does_not_panic() {
        let config = LoggingConfig::default();
        config.init();
        config.init();
    }
}
