//! The [`SqldProcess`] handle and [`spawn_binary`].
//!
//! A child started with [`RunOptions::process_group()`] leads its own process
//! group; `kill`, `start_kill` and `terminate` then signal the whole group so
//! a wrapper script cannot leave its children behind.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

#[cfg(unix)]
use super::shutdown::send_signal;
use super::shutdown::{shutdown_child, shutdown_group};
use crate::error::{SqldError, SqldResult};
use crate::options::RunOptions;

/// A running sqld process.
///
/// Wraps the `tokio` child together with the binary it was started from.
/// Dropping the handle leaves the process running unless the options asked
/// for `kill_on_drop`.
#[derive(Debug)]
pub struct SqldProcess {
    child: Child,
    path: PathBuf,
    group: bool,
}

/// Start `binary` with `args` and return immediately.
///
/// Must be called from within a Tokio runtime. No readiness check is made;
/// a process that fails right after starting shows up through [`SqldProcess::wait`].
pub fn spawn_binary<I, S>(binary: &Path, args: I, options: &RunOptions) -> SqldResult<SqldProcess>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::from(options.command(binary, args));
    command.kill_on_drop(options.kill_on_drop);

    let child = command.spawn().map_err(|source| SqldError::Spawn {
        path: binary.to_path_buf(),
        source,
    })?;

    info!(binary = %binary.display(), pid = ?child.id(), "spawned sqld");
    Ok(SqldProcess {
        child,
        path: binary.to_path_buf(),
        group: cfg!(unix) && options.process_group,
    })
}

impl SqldProcess {
    /// OS process id; `None` once the process has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// The binary this process was started from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the piped stdin; `None` if not piped or already taken.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    /// Take the piped stdout; `None` if not piped or already taken.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Take the piped stderr; `None` if not piped or already taken.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for the process to exit.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait().await?;
        info!(binary = %self.path.display(), %status, "sqld exited");
        Ok(status)
    }

    /// Exit status if the process has already exited.
    pub fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Wait for exit, collecting whatever stdout and stderr are still piped.
    pub async fn wait_with_output(self) -> io::Result<Output> {
        self.child.wait_with_output().await
    }

    /// Kill the process and wait for it.
    pub async fn kill(&mut self) -> io::Result<()> {
        self.kill_group()?;
        self.child.kill().await
    }

    /// Request a kill without waiting.
    pub fn start_kill(&mut self) -> io::Result<()> {
        self.kill_group()?;
        self.child.start_kill()
    }

    /// SIGKILL every member of the process group, if the child leads one.
    #[cfg(unix)]
    fn kill_group(&self) -> io::Result<()> {
        match self.child.id() {
            Some(pid) if self.group => send_signal(pid, Signal::SIGKILL, true),
            _ => Ok(()),
        }
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    fn kill_group(&self) -> io::Result<()> {
        Ok(())
    }

    /// Send `sig` to the process only, never its group.
    #[cfg(unix)]
    pub fn signal(&self, sig: Signal) -> io::Result<()> {
        let pid = self
            .child
            .id()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "process already reaped"))?;
        let pid = i32::try_from(pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PID out of range"))?;
        signal::kill(Pid::from_raw(pid), sig).map_err(io::Error::from)
    }

    /// SIGTERM, then SIGKILL if the process is still alive after `grace`.
    pub async fn terminate(&mut self, grace: Duration) -> io::Result<ExitStatus> {
        let status = if self.group {
            shutdown_group(&mut self.child, grace).await?
        } else {
            shutdown_child(&mut self.child, grace).await?
        };
        info!(binary = %self.path.display(), %status, "sqld terminated");
        Ok(status)
    }

    /// Relay piped stdout and stderr to `tracing` line by line.
    ///
    /// Takes both streams; streams that are not piped are skipped. The reader
    /// tasks end when the process closes its side.
    pub fn forward_output_to_tracing(&mut self) {
        let pid = self.child.id();
        if let Some(stdout) = self.child.stdout.take() {
            tokio::spawn(forward_lines(stdout, pid, "stdout"));
        }
        if let Some(stderr) = self.child.stderr.take() {
            tokio::spawn(forward_lines(stderr, pid, "stderr"));
        }
    }

    /// Give up the wrapper and return the underlying child.
    pub fn into_child(self) -> Child {
        self.child
    }
}

async fn forward_lines<R>(stream: R, pid: Option<u32>, name: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(text)) = lines.next_line().await {
        debug!(pid = ?pid, stream = name, "{}", text);
    }
    debug!(pid = ?pid, stream = name, "reader task exiting");
}
