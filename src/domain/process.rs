//! Handles for spawned processes.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::service::ServiceKind;
use crate::port::ManagedProcess;

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    code: Option<i32>,
}

impl ExitInfo {
    /// Exit with a status code, or `None` when killed by a signal.
    #[must_use]
    pub const fn new(code: Option<i32>) -> Self {
        Self { code }
    }

    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        self.code
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ExitInfo {
    fn from(status: std::process::ExitStatus) -> Self {
        Self::new(status.code())
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// A spawned OS process owned by the supervisor.
pub struct ProcessHandle {
    name: String,
    kind: ServiceKind,
    pid: Option<u32>,
    log_path: PathBuf,
    exit: Option<ExitInfo>,
    process: Box<dyn ManagedProcess>,
}

impl ProcessHandle {
    pub fn new(
        name: impl Into<String>,
        kind: ServiceKind,
        log_path: impl Into<PathBuf>,
        process: Box<dyn ManagedProcess>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            pid: process.id(),
            log_path: log_path.into(),
            exit: None,
            process,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Exit status, once observed.
    #[must_use]
    pub fn exit(&self) -> Option<ExitInfo> {
        self.exit
    }

    /// Check without blocking whether the process has exited.
    ///
    /// Once an exit is observed it is remembered; later calls return it
    /// without asking the OS again.
    pub fn poll_exit(&mut self) -> io::Result<Option<ExitInfo>> {
        if self.exit.is_none() {
            self.exit = self.process.try_exit()?;
        }
        Ok(self.exit)
    }

    /// Ask the process to terminate. Does not wait for it.
    pub fn terminate(&mut self) -> io::Result<()> {
        self.process.terminate()
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("pid", &self.pid)
            .field("log_path", &self.log_path)
            .field("exit", &self.exit)
            .finish_non_exhaustive()
    }
}
