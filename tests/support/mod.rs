#![allow(dead_code)]

pub mod engine;
#[cfg(unix)]
pub mod process;
pub mod project;

pub use engine::RecordingEngine;
pub use project::{fast_config, sh_service, unused_port, Project};
