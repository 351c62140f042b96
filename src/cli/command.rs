//! Command-line interface definitions.
//!
//! Global flags control where the project lives and how output is rendered;
//! subcommands map onto the lifecycle phases.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bring up a multi-service development stack and keep it running
#[derive(Parser, Debug)]
#[command(name = "stackup")]
#[command(version)]
pub struct Cli {
    /// Launcher configuration file [default: <root>/stackup.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root containing the backend and frontend directories
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Config file path, defaulting to `stackup.toml` in the project root.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.root.join("stackup.toml"))
    }
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start every service and supervise them until Ctrl+C
    Up(UpArgs),

    /// Check prerequisites and project layout without starting anything
    Check,

    /// Manage the launcher configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print the tail of a service's log
    Logs(LogsArgs),
}

/// Subcommands for `stackup config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a documented configuration template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show,
}

/// Arguments for the `up` subcommand.
#[derive(Parser, Debug, Default)]
pub struct UpArgs {
    /// Skip the shared-library build.
    #[arg(long)]
    pub no_build: bool,

    /// Do not start container services.
    #[arg(long)]
    pub no_containers: bool,

    /// Override log level (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `config init` subcommand.
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `logs` subcommand.
#[derive(Parser, Debug)]
pub struct LogsArgs {
    /// Service (or frontend) name.
    pub service: String,

    /// Number of lines to show.
    #[arg(short = 'n', long, default_value = "50")]
    pub lines: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_flags_parse() {
        let cli = Cli::try_parse_from([
            "stackup",
            "up",
            "--no-build",
            "--no-containers",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let Commands::Up(args) = cli.command else {
            panic!("expected up");
        };
        assert!(args.no_build);
        assert!(args.no_containers);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(!args.json_logs);
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["stackup", "check", "--json", "-vv", "--root", "/srv/app"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, PathBuf::from("/srv/app"));
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn config_path_defaults_into_root() {
        let cli = Cli::try_parse_from(["stackup", "--root", "/srv/app", "check"]).unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("/srv/app/stackup.toml"));

        let cli = Cli::try_parse_from(["stackup", "--config", "custom.toml", "check"]).unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("custom.toml"));
    }

    #[test]
    fn color_defaults_to_auto() {
        let cli = Cli::try_parse_from(["stackup", "check"]).unwrap();
        assert_eq!(cli.color, ColorChoice::Auto);

        let cli = Cli::try_parse_from(["stackup", "--color", "never", "check"]).unwrap();
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn logs_takes_service_and_line_count() {
        let cli = Cli::try_parse_from(["stackup", "logs", "auth", "-n", "10"]).unwrap();
        let Commands::Logs(args) = cli.command else {
            panic!("expected logs");
        };
        assert_eq!(args.service, "auth");
        assert_eq!(args.lines, 10);
    }

    #[test]
    fn config_init_force() {
        let cli = Cli::try_parse_from(["stackup", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommand::Init(ConfigInitArgs { force: true }))
        ));
    }
}
