//! Handler for `stackup check`.

use crate::cli::output;
use crate::error::{Error, Result};
use crate::lifecycle::Launcher;

/// Report prerequisites and project directories without side effects.
///
/// # Errors
///
/// Fails when an executable or directory is missing, after reporting all of them.
pub async fn execute(launcher: &Launcher) -> Result<()> {
    output::section("Prerequisites");
    let report = launcher.check_prerequisites().await;
    for tool in &report.found {
        output::success(&format!(
            "{} {} ({})",
            tool.name,
            output::highlight(tool.version.as_deref().unwrap_or("version unknown")),
            tool.path.display()
        ));
    }
    for name in &report.missing {
        output::error(&format!("{name} not found on PATH"));
    }

    output::section("Project");
    let mut dirs = vec![("Backend", launcher.backend_dir())];
    if launcher.config().frontend.enabled {
        dirs.push(("Frontend", launcher.frontend_dir()));
    }
    for (label, dir) in &dirs {
        if dir.is_dir() {
            output::success(&format!("{label} {}", dir.display()));
        } else {
            output::error(&format!("{label} directory not found: {}", dir.display()));
        }
    }

    if !report.is_satisfied() {
        return Err(Error::MissingPrerequisites(report.missing));
    }
    launcher.check_directories()?;

    output::success("Ready to start");
    Ok(())
}
