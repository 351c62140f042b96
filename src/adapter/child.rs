//! OS child processes as [`ManagedProcess`].

use std::io;

use tokio::process::Child;

use crate::domain::ExitInfo;
use crate::port::ManagedProcess;

impl ManagedProcess for Child {
    fn id(&self) -> Option<u32> {
        Child::id(self)
    }

    fn try_exit(&mut self) -> io::Result<Option<ExitInfo>> {
        Ok(self.try_wait()?.map(ExitInfo::from))
    }

    fn terminate(&mut self) -> io::Result<()> {
        // Already reaped: nothing left to signal.
        let Some(pid) = Child::id(self) else {
            return Ok(());
        };
        send_sigterm(pid, self)
    }
}

#[cfg(unix)]
fn send_sigterm(pid: u32, _child: &mut Child) -> io::Result<()> {
    let pid = libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn send_sigterm(_pid: u32, child: &mut Child) -> io::Result<()> {
    child.start_kill()
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use tokio::process::Command;

    use super::*;

    #[tokio::test]
    async fn terminate_stops_a_sleeping_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        assert_eq!(ManagedProcess::try_exit(&mut child).unwrap(), None);

        ManagedProcess::terminate(&mut child).unwrap();
        let status = tokio::time::timeout(Duration::from_secs(5), child.wait())
            .await
            .expect("child did not stop")
            .unwrap();

        // SIGTERM leaves no exit code.
        assert_eq!(ExitInfo::from(status).code(), None);
    }

    #[tokio::test]
    async fn try_exit_reports_exit_code() {
        let mut child = Command::new("sh").args(["-c", "exit 7"]).spawn().unwrap();
        child.wait().await.unwrap();

        let exit = ManagedProcess::try_exit(&mut child).unwrap();
        assert_eq!(exit, Some(ExitInfo::new(Some(7))));
        // Reaped children have no pid and terminate is a no-op.
        assert!(ManagedProcess::terminate(&mut child).is_ok());
    }
}
