//! Launcher domain: what is started, what is running, and who owns it.

mod container;
mod overlay;
mod process;
mod service;
mod state;

pub use container::ContainerBackend;
pub use overlay::EnvironmentOverlay;
pub use process::{ExitInfo, ProcessHandle};
pub use service::{LaunchDirective, ServiceKind, ServiceSpec};
pub use state::SupervisorState;
