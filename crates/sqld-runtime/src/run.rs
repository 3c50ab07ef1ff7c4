//! Synchronous invocation.
//!
//! Runs the binary to completion on the calling thread. Piped stdout and
//! stderr are drained on reader threads so a chatty child cannot fill its
//! pipe and deadlock against `wait`. A piped stdin is closed right after
//! spawn, so the child sees end-of-file.
//!
//! On timeout the child's whole process group is killed. Output still
//! held open by something outside the group is given up after
//! [`DRAIN_AFTER_KILL`].

use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

use crate::error::{ExecutionError, ExecutionFailure, SqldError, SqldResult};
use crate::options::RunOptions;
#[cfg(unix)]
use crate::process::send_signal;

/// How long captured output may keep draining once a timed-out child is dead.
pub const DRAIN_AFTER_KILL: Duration = Duration::from_millis(500);

/// Output of a successful synchronous run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit status (always successful).
    pub status: ExitStatus,
    /// Captured standard output; empty if not piped.
    pub stdout: Vec<u8>,
    /// Captured standard error; empty if not piped.
    pub stderr: Vec<u8>,
}

impl RunOutput {
    /// Captured standard output as text.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Captured standard error as text.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// How the wait ended.
enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut(Duration),
}

/// Run `binary` with `args` and block until it exits or times out.
pub fn run_binary_sync<I, S>(binary: &Path, args: I, options: &RunOptions) -> SqldResult<RunOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = options.command(binary, args);
    debug!(
        binary = %binary.display(),
        args = ?command.get_args().collect::<Vec<_>>(),
        "running sqld"
    );

    let started = Instant::now();
    let mut child = command.spawn().map_err(|source| SqldError::Spawn {
        path: binary.to_path_buf(),
        source,
    })?;

    drop(child.stdin.take());
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let outcome = match options.timeout {
        Some(limit) => match child.wait_timeout(limit)? {
            Some(status) => WaitOutcome::Exited(status),
            None => {
                warn!(
                    binary = %binary.display(),
                    pid = child.id(),
                    timeout_ms = limit.as_millis(),
                    "sqld exceeded its timeout, killing"
                );
                kill_and_reap(&mut child, options.process_group)?;
                WaitOutcome::TimedOut(limit)
            }
        },
        None => WaitOutcome::Exited(child.wait()?),
    };

    let drain = match outcome {
        WaitOutcome::Exited(_) => None,
        WaitOutcome::TimedOut(_) => Some(DRAIN_AFTER_KILL),
    };
    let stdout = collect_output(stdout_reader, drain)?;
    let stderr = collect_output(stderr_reader, drain)?;

    let failure = match outcome {
        WaitOutcome::Exited(status) if status.success() => {
            info!(
                binary = %binary.display(),
                elapsed_ms = started.elapsed().as_millis(),
                "sqld exited successfully"
            );
            return Ok(RunOutput {
                status,
                stdout,
                stderr,
            });
        }
        WaitOutcome::Exited(status) => ExecutionFailure::Exited {
            code: status.code(),
        },
        WaitOutcome::TimedOut(after) => ExecutionFailure::TimedOut { after },
    };

    info!(binary = %binary.display(), %failure, "sqld run failed");
    Err(ExecutionError {
        path: PathBuf::from(binary),
        failure,
        stdout,
        stderr,
    }
    .into())
}

type OutputReader = Receiver<io::Result<Vec<u8>>>;

fn spawn_reader<R>(mut stream: R) -> OutputReader
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = stream.read_to_end(&mut buf).map(|_| buf);
        // Receiver gone means the caller stopped waiting
        let _ = tx.send(result);
    });
    rx
}

/// Wait for a reader's output, for at most `limit` when one is given.
fn collect_output(reader: Option<OutputReader>, limit: Option<Duration>) -> io::Result<Vec<u8>> {
    let Some(reader) = reader else {
        return Ok(Vec::new());
    };
    let received = match limit {
        Some(limit) => reader.recv_timeout(limit),
        None => reader.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            debug!("output still held open after kill, giving up on it");
            Ok(Vec::new())
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(io::Error::other("output reader thread panicked"))
        }
    }
}

/// Kill the child, and its process group when it leads one, then reap it.
fn kill_and_reap(child: &mut Child, group: bool) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    if group {
        send_signal(child.id(), nix::sys::signal::Signal::SIGKILL, true)?;
    }
    #[cfg(not(unix))]
    let _ = group;

    match child.kill() {
        Ok(()) => {}
        // Already exited between the timeout and the kill
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
        Err(e) => return Err(e),
    }
    child.wait()
}
