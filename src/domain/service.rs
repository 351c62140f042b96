//! Service registry entries.

use std::fmt;
use std::path::{Path, PathBuf};

/// How to start one process: program, arguments and working directory.
///
/// Opaque to the supervisor; only the launcher interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchDirective {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
}

impl LaunchDirective {
    /// Build a directive from a program and its arguments.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            workdir: workdir.into(),
        }
    }

    /// Build a directive from an argv-style slice. Returns `None` when empty.
    pub fn from_argv(argv: &[String], workdir: impl Into<PathBuf>) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned(), workdir))
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl fmt::Display for LaunchDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Which part of the stack a process belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Backend,
    Frontend,
}

impl ServiceKind {
    #[must_use]
    pub fn is_backend(self) -> bool {
        matches!(self, Self::Backend)
    }
}

/// Immutable descriptor of one managed process.
///
/// Built once per run from the ordered registry and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    name: String,
    port: u16,
    kind: ServiceKind,
    directive: LaunchDirective,
}

impl ServiceSpec {
    /// Create a backend service descriptor.
    pub fn backend(name: impl Into<String>, port: u16, directive: LaunchDirective) -> Self {
        Self {
            name: name.into(),
            port,
            kind: ServiceKind::Backend,
            directive,
        }
    }

    /// Create the frontend descriptor.
    pub fn frontend(name: impl Into<String>, port: u16, directive: LaunchDirective) -> Self {
        Self {
            name: name.into(),
            port,
            kind: ServiceKind::Frontend,
            directive,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    #[must_use]
    pub fn directive(&self) -> &LaunchDirective {
        &self.directive
    }

    /// File name of this process's log sink.
    ///
    /// Backend services log to `<name>-service.log`, the frontend to `<name>.log`.
    #[must_use]
    pub fn log_file_name(&self) -> String {
        match self.kind {
            ServiceKind::Backend => format!("{}-service.log", self.name),
            ServiceKind::Frontend => format!("{}.log", self.name),
        }
    }

    /// Full path of the log sink inside `log_dir`.
    #[must_use]
    pub fn log_path(&self, log_dir: &Path) -> PathBuf {
        log_dir.join(self.log_file_name())
    }
}
