//! Handler for `stackup logs`.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::cli::output;
use crate::error::{ConfigError, Result};
use crate::lifecycle::Launcher;

/// Print the last `lines` lines of a service's log sink.
///
/// # Errors
///
/// Fails for an unknown service name or an unreadable log.
pub fn execute(launcher: &Launcher, service: &str, lines: usize) -> Result<()> {
    let path = log_path(launcher, service)?;

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            output::warning(&format!("No log yet for {service} at {}", path.display()));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    output::lines(&tail(&content, lines));
    Ok(())
}

/// Resolve the log sink of a backend service or the frontend.
fn log_path(launcher: &Launcher, service: &str) -> Result<PathBuf> {
    let config = launcher.config();
    let log_dir = launcher.log_dir();

    config
        .service_specs(launcher.root())
        .into_iter()
        .chain(config.frontend_spec(launcher.root()))
        .find(|spec| spec.name() == service)
        .map(|spec| spec.log_path(&log_dir))
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "service",
                reason: format!("unknown service '{service}'"),
            }
            .into()
        })
}

fn tail(content: &str, lines: usize) -> String {
    let all: Vec<&str> = content.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
