//! Graceful shutdown for `tokio::process::Child` with SIGTERM → SIGKILL escalation.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tracing::{debug, warn};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
#[cfg(unix)]
use tokio::time::timeout;

/// How long sqld gets to exit after SIGTERM before it is killed.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Shut down a child process with SIGTERM, escalating to SIGKILL after `grace`.
///
/// # Strategy
/// 1. Send SIGTERM and wait up to `grace` for the process to exit
/// 2. If still running, send SIGKILL
/// 3. Wait for the process to be reaped
///
/// On Windows there is no SIGTERM; the process is killed immediately.
///
/// # Returns
/// - `Ok(ExitStatus)` once the process has been reaped
/// - `Err` if a signal or wait fails
pub async fn shutdown_child(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    shutdown(child, grace, false).await
}

/// [`shutdown_child`] for a child that leads its own process group.
///
/// Both signals go to the whole group, and group members still alive once
/// the leader has been reaped are killed.
pub(crate) async fn shutdown_group(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    shutdown(child, grace, true).await
}

async fn shutdown(child: &mut Child, grace: Duration, group: bool) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        shutdown_unix(child, grace, group).await
    }

    #[cfg(not(unix))]
    {
        let _ = (grace, group);
        shutdown_windows(child).await
    }
}

/// Send `sig` to `pid`, or to the process group it leads.
///
/// A target that no longer exists is not an error.
#[cfg(unix)]
pub(crate) fn send_signal(pid: u32, sig: Signal, group: bool) -> io::Result<()> {
    let pid = i32::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PID out of range"))?;
    let pid = Pid::from_raw(pid);
    let result = if group {
        signal::killpg(pid, sig)
    } else {
        signal::kill(pid, sig)
    };
    match result {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::from(e)),
    }
}

#[cfg(unix)]
async fn shutdown_unix(child: &mut Child, grace: Duration, group: bool) -> io::Result<ExitStatus> {
    // Already reaped
    let Some(pid) = child.id() else {
        return child.wait().await;
    };

    send_signal(pid, Signal::SIGTERM, group)?;
    debug!(pid, group, grace_ms = grace.as_millis(), "sent SIGTERM to sqld");

    let status = if let Ok(result) = timeout(grace, child.wait()).await {
        result?
    } else {
        warn!(pid, "sqld ignored SIGTERM, sending SIGKILL");
        if group {
            send_signal(pid, Signal::SIGKILL, true)?;
        }
        child.kill().await?;
        child.wait().await?
    };

    // Stragglers that ignored SIGTERM
    if group {
        send_signal(pid, Signal::SIGKILL, true)?;
    }
    Ok(status)
}

#[cfg(not(unix))]
async fn shutdown_windows(child: &mut Child) -> io::Result<ExitStatus> {
    child.kill().await?;
    child.wait().await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::Stdio;
    use std::time::Instant;
    use tokio::io::AsyncReadExt;
    use tokio::process::Command;
    use tokio::time::sleep;

    #[tokio::test]
    async fn sigterm_stops_cooperative_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();

        let status = shutdown_child(&mut child, DEFAULT_GRACE_PERIOD)
            .await
            .unwrap();
        assert_eq!(status.signal(), Some(Signal::SIGTERM as i32));
    }

    #[tokio::test]
    async fn escalates_when_sigterm_is_ignored() {
        let mut child = Command::new("sh")
            .args(["-c", "trap '' TERM; while :; do sleep 1; done"])
            .spawn()
            .unwrap();
        // Let the shell install its trap
        sleep(Duration::from_millis(200)).await;

        let started = Instant::now();
        let status = shutdown_child(&mut child, Duration::from_millis(100))
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(status.signal(), Some(Signal::SIGKILL as i32));
    }

    #[tokio::test]
    async fn group_shutdown_reaches_grandchildren() {
        let mut child = Command::new("sh")
            .args(["-c", "sleep 30; echo done"])
            .process_group(0)
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        let mut stdout = child.stdout.take().unwrap();

        let status = shutdown_group(&mut child, DEFAULT_GRACE_PERIOD)
            .await
            .unwrap();
        assert_eq!(status.signal(), Some(Signal::SIGTERM as i32));

        // EOF only once the sleep holding the pipe is gone too
        let mut rest = Vec::new();
        tokio::time::timeout(Duration::from_secs(2), stdout.read_to_end(&mut rest))
            .await
            .expect("grandchild kept the pipe open")
            .unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn already_exited_child_is_reaped() {
        let mut child = Command::new("true").spawn().unwrap();
        sleep(Duration::from_millis(100)).await;

        let status = shutdown_child(&mut child, DEFAULT_GRACE_PERIOD)
            .await
            .unwrap();
        assert!(status.success());
    }
}
