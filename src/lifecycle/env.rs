//! Environment file provisioning and parsing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::EnvironmentOverlay;

/// What [`EnvironmentProvisioner::ensure_config`] did.
#[derive(Debug)]
pub enum ProvisionOutcome {
    /// The file was already there and was left untouched.
    Exists,
    /// The file was copied from the template.
    Created,
    /// Neither file nor template exists.
    TemplateMissing,
    /// Copying the template failed.
    Failed(io::Error),
}

/// Materializes and reads the services' `KEY=VALUE` configuration file.
#[derive(Debug, Clone)]
pub struct EnvironmentProvisioner {
    file: PathBuf,
    template: PathBuf,
}

impl EnvironmentProvisioner {
    pub fn new(file: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            template: template.into(),
        }
    }

    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    #[must_use]
    pub fn template(&self) -> &Path {
        &self.template
    }

    /// Copy the template into place if the file is absent. Never overwrites.
    pub fn ensure_config(&self) -> ProvisionOutcome {
        if self.file.exists() {
            return ProvisionOutcome::Exists;
        }
        if !self.template.is_file() {
            warn!(template = %self.template.display(), "Environment template not found");
            return ProvisionOutcome::TemplateMissing;
        }

        match fs::copy(&self.template, &self.file) {
            Ok(_) => {
                info!(file = %self.file.display(), "Created environment file from template");
                ProvisionOutcome::Created
            }
            Err(e) => {
                warn!(file = %self.file.display(), error = %e, "Failed to create environment file");
                ProvisionOutcome::Failed(e)
            }
        }
    }

    /// Ambient process environment overlaid with the file's entries.
    pub fn load_overlay(&self) -> EnvironmentOverlay {
        self.load_overlay_onto(EnvironmentOverlay::ambient())
    }

    /// Overlay the file's entries onto `base`.
    ///
    /// A missing file contributes nothing. An unreadable file is logged and
    /// `base` is returned unchanged.
    pub fn load_overlay_onto(&self, mut base: EnvironmentOverlay) -> EnvironmentOverlay {
        if !self.file.exists() {
            return base;
        }

        match fs::read_to_string(&self.file) {
            Ok(content) => {
                let entries = parse_env(&content);
                info!(file = %self.file.display(), entries = entries.len(), "Loaded environment file");
                base.extend(entries);
            }
            Err(e) => {
                warn!(file = %self.file.display(), error = %e, "Could not load environment file");
            }
        }
        base
    }
}

/// Parse `KEY=VALUE` lines in file order.
///
/// Blank lines, `#` comments and lines without `=` are skipped. The value is
/// everything after the first `=`, trimmed, with surrounding double quotes and
/// then single quotes stripped. Duplicates are kept; the caller's map makes the
/// last one win.
pub fn parse_env(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"').trim_matches('\'');
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
