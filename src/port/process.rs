//! Process port: the seam between the supervisor and OS processes.

use std::io;

use crate::domain::ExitInfo;

/// A spawned process the supervisor can observe and stop.
///
/// Implementations must not block: `try_exit` only checks, and `terminate`
/// only sends the request.
pub trait ManagedProcess: Send {
    /// OS process id, if the process has not been reaped yet.
    fn id(&self) -> Option<u32>;

    /// Returns the exit info if the process has exited, `None` while it runs.
    fn try_exit(&mut self) -> io::Result<Option<ExitInfo>>;

    /// Request termination.
    fn terminate(&mut self) -> io::Result<()>;
}
