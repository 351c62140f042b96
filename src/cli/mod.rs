//! CLI module graph and dispatch.

pub mod check;
pub mod command;
pub mod config;
pub mod logs;
pub mod output;
pub mod up;

use std::io::IsTerminal;

use crate::config::Config;
use crate::error::Result;
use crate::lifecycle::Launcher;

pub use command::{Cli, ColorChoice, Commands, ConfigCommand, LogsArgs, UpArgs};

/// Resolve `--color` against the terminal and `NO_COLOR`.
#[must_use]
pub fn use_color(choice: ColorChoice, json: bool) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            !json && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
        }
    }
}

/// Run the parsed command. Returns the process exit code.
///
/// # Errors
///
/// Fatal errors bubble up for `main` to report.
pub async fn run(cli: Cli) -> Result<i32> {
    output::configure(output::OutputConfig::new(
        cli.json,
        cli.quiet,
        use_color(cli.color, cli.json),
    ));

    let config_path = cli.config_path();

    // `config init` must work even when the existing file is broken.
    if let Commands::Config(ConfigCommand::Init(args)) = &cli.command {
        config::execute_init(&config_path, args.force)?;
        return Ok(0);
    }

    let mut settings = Config::load_or_default(&config_path)?;
    settings.logging.apply_verbosity(cli.verbose);
    if let Commands::Up(args) = &cli.command {
        if let Some(level) = &args.log_level {
            settings.logging.level = level.clone();
        }
        if args.json_logs {
            settings.logging.format = "json".to_string();
        }
    }
    settings.logging.init();

    let launcher = Launcher::new(settings, &cli.root);
    match cli.command {
        Commands::Up(args) => up::execute(&launcher, &args).await,
        Commands::Check => check::execute(&launcher).await.map(|()| 0),
        Commands::Config(ConfigCommand::Show) => {
            config::execute_show(&launcher, &config_path);
            Ok(0)
        }
        Commands::Config(ConfigCommand::Init(_)) => Ok(0),
        Commands::Logs(args) => logs::execute(&launcher, &args.service, args.lines).map(|()| 0),
    }
}
