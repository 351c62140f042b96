//! Traits at the seams to the outside world.
//!
//! The lifecycle code talks to OS processes and container tooling only
//! through these ports, which lets tests substitute recording fakes.
//!
//! - [`ManagedProcess`] - a spawned child the supervisor polls and stops
//! - [`ContainerEngine`] - the container tool that runs auxiliary services

mod container;
mod process;

pub use container::{ContainerEngine, EngineOutput};
pub use process::ManagedProcess;
