//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::error::{ConfigError, Result};
use crate::lifecycle::Launcher;

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../stackup.toml.example");

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Edit {} to match your project", path.display()));
    output::note("2. Run: stackup check");
    output::note("3. Run: stackup up");
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(launcher: &Launcher, path: &Path) {
    let config = launcher.config();
    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };

    output::section("Effective Configuration");
    output::field("Source", source);
    output::field("Root", launcher.root().display());
    output::field("Backend", launcher.backend_dir().display());
    output::field("Frontend", launcher.frontend_dir().display());
    output::field("Env file", launcher.provisioner().file().display());
    output::field("Logs", launcher.log_dir().display());

    output::section("Services");
    for spec in config.service_specs(launcher.root()) {
        output::field(
            spec.name(),
            format!("port {}  {}", spec.port(), spec.directive()),
        );
    }
    if let Some(spec) = config.frontend_spec(launcher.root()) {
        output::field(
            spec.name(),
            format!("port {}  {}", spec.port(), spec.directive()),
        );
    } else {
        output::note("frontend disabled");
    }

    output::section("Timing");
    let timing = &config.timing;
    output::field("Grace", format!("{}ms", timing.grace_ms));
    output::field("Stagger", format!("{}ms", timing.stagger_ms));
    output::field("Warm-up", format!("{}ms", timing.warmup_ms));
    output::field("Health", format!("{}ms timeout", timing.health_timeout_ms));
    output::field("Tick", format!("{}ms", timing.tick_ms));

    output::section("Containers");
    if config.containers.enabled {
        output::field("Engine", &config.containers.engine);
        output::field("Descriptor", &config.containers.descriptor);
    } else {
        output::note("disabled");
    }
}
