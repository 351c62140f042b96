//! Stackup - bring up a multi-service development stack and keep it running.
//!
//! One command checks the toolchain, provisions the services' environment
//! file, installs dependencies, builds shared packages, starts optional
//! container services, launches every backend service and the frontend,
//! probes their health endpoints, and then supervises the running processes
//! until they all exit or the operator interrupts.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with built-in defaults for every key
//! - [`domain`] - Service descriptors, process handles, supervisor state
//! - [`port`] - Traits for spawned processes and container engines
//! - [`adapter`] - tokio child processes and the compose CLI behind those traits
//! - [`lifecycle`] - One module per startup phase, plus supervision and shutdown
//! - [`cli`] - Command tree and operator-facing output
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use stackup::config::Config;
//! use stackup::domain::SupervisorState;
//! use stackup::lifecycle::{listen_for_signals, Launcher};
//!
//! # async fn run() -> stackup::error::Result<()> {
//! let launcher = Launcher::new(Config::load_or_default("stackup.toml")?, ".");
//! launcher.preflight().await?;
//! launcher.provision();
//!
//! let mut state = SupervisorState::new();
//! let mut signals = listen_for_signals()?;
//! launcher.launch_services(&launcher.overlay(), &mut state).await;
//! launcher.supervisor().run(&mut state, &mut signals, |_| {}).await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod port;
