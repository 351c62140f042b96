//! Scratch project trees and fast-running configurations.

use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};

use stackup::config::{Config, Prerequisite, ServiceConfig};
use tempfile::TempDir;

/// A temporary project root with `backend/`, `frontend/` and `logs/`.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp project");
        for sub in ["backend", "frontend", "logs"] {
            fs::create_dir_all(dir.path().join(sub)).expect("create project dir");
        }
        Self { dir }
    }

    /// A root with no project directories at all.
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn backend(&self) -> PathBuf {
        self.root().join("backend")
    }

    pub fn logs(&self) -> PathBuf {
        self.root().join("logs")
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, content).expect("write project file");
        path
    }

    pub fn read_log(&self, file_name: &str) -> String {
        fs::read_to_string(self.logs().join(file_name)).unwrap_or_default()
    }
}

/// A backend service run through `sh -c`.
pub fn sh_service(name: &str, port: u16, script: &str) -> ServiceConfig {
    ServiceConfig::new(name, port).with_command(vec!["sh".into(), "-c".into(), script.into()])
}

/// Config with short timings, no frontend, no containers and a no-op build.
pub fn fast_config(project: &Project, services: Vec<ServiceConfig>) -> Config {
    let mut config = Config::default();
    config.prerequisites = vec![Prerequisite::new("sh", "POSIX shell")];
    config.services = services;
    config.frontend.enabled = false;
    config.containers.enabled = false;
    config.build.script = None;
    config.build.fallback = vec!["true".into()];
    config.timing.grace_ms = 300;
    config.timing.stagger_ms = 10;
    config.timing.warmup_ms = 10;
    config.timing.health_timeout_ms = 300;
    config.timing.tick_ms = 100;
    config.logs.dir = Some(project.logs());
    config
}

/// A localhost port with nothing listening on it.
pub fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}
