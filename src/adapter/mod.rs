//! Implementations of the ports against the real OS.
//!
//! - `child` - tokio child processes as [`ManagedProcess`](crate::port::ManagedProcess)
//! - [`ComposeCli`] - a compose-style CLI as [`ContainerEngine`](crate::port::ContainerEngine)

mod child;
mod compose;

pub use compose::ComposeCli;
