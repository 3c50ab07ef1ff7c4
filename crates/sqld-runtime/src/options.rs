//! Invocation options shared by the synchronous and asynchronous runners.
//!
//! Options are passed straight through to the process-spawn primitive. The
//! one addition is [`RunOptions::process_group()`], which decides how far a
//! kill reaches.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Wiring for one standard stream of the child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdioMode {
    /// Share the parent's stream.
    Inherit,
    /// Connect a pipe (captured in synchronous mode, exposed on the handle in
    /// asynchronous mode).
    #[default]
    Piped,
    /// Connect to the null device.
    Null,
}

impl From<StdioMode> for Stdio {
    fn from(mode: StdioMode) -> Self {
        match mode {
            StdioMode::Inherit => Self::inherit(),
            StdioMode::Piped => Self::piped(),
            StdioMode::Null => Self::null(),
        }
    }
}

/// Options for running the sqld binary.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory; the parent's when `None`.
    pub working_dir: Option<PathBuf>,
    /// Variables set on top of the inherited environment.
    pub env: Vec<(OsString, OsString)>,
    /// Start from an empty environment instead of inheriting.
    pub env_clear: bool,
    /// Standard input wiring.
    pub stdin: StdioMode,
    /// Standard output wiring.
    pub stdout: StdioMode,
    /// Standard error wiring.
    pub stderr: StdioMode,
    /// Synchronous mode only: kill the child and fail once this elapses.
    pub timeout: Option<Duration>,
    /// Asynchronous mode only: kill the child when its handle is dropped.
    pub kill_on_drop: bool,
    /// Unix only: start the child as leader of a new process group, so a
    /// timeout, kill or terminate also reaches the processes it started.
    pub process_group: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            working_dir: None,
            env: Vec::new(),
            env_clear: false,
            stdin: StdioMode::default(),
            stdout: StdioMode::default(),
            stderr: StdioMode::default(),
            timeout: None,
            kill_on_drop: false,
            process_group: true,
        }
    }
}

impl RunOptions {
    /// Default options: inherited environment and cwd, all streams piped,
    /// child in its own process group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run in `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set one environment variable.
    #[must_use]
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env.push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Set several environment variables.
    #[must_use]
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.env.extend(
            vars.into_iter()
                .map(|(k, v)| (k.as_ref().to_os_string(), v.as_ref().to_os_string())),
        );
        self
    }

    /// Do not inherit the parent's environment.
    #[must_use]
    pub fn env_clear(mut self) -> Self {
        self.env_clear = true;
        self
    }

    /// Standard input wiring.
    #[must_use]
    pub fn stdin(mut self, mode: StdioMode) -> Self {
        self.stdin = mode;
        self
    }

    /// Standard output wiring.
    #[must_use]
    pub fn stdout(mut self, mode: StdioMode) -> Self {
        self.stdout = mode;
        self
    }

    /// Standard error wiring.
    #[must_use]
    pub fn stderr(mut self, mode: StdioMode) -> Self {
        self.stderr = mode;
        self
    }

    /// Share all three streams with the parent.
    #[must_use]
    pub fn inherit_stdio(self) -> Self {
        self.stdin(StdioMode::Inherit)
            .stdout(StdioMode::Inherit)
            .stderr(StdioMode::Inherit)
    }

    /// Kill the synchronous run after `timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Kill the synchronous run after `ms` milliseconds.
    #[must_use]
    pub fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }

    /// Kill the asynchronous child when its handle is dropped.
    #[must_use]
    pub fn kill_on_drop(mut self, kill: bool) -> Self {
        self.kill_on_drop = kill;
        self
    }

    /// Keep the child in its own process group (`true`) or in the caller's.
    ///
    /// Sharing the caller's group lets the terminal deliver Ctrl-C to the
    /// child directly, but group-wide signals are then never sent.
    #[must_use]
    pub fn process_group(mut self, own: bool) -> Self {
        self.process_group = own;
        self
    }

    /// Build the command for `program` with these options applied.
    pub(crate) fn command<I, S>(&self, program: &Path, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(program);
        cmd.args(args);

        if self.env_clear {
            cmd.env_clear();
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        if self.process_group {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd.stdin(self.stdin).stdout(self.stdout).stderr(self.stderr);
        cmd
    }
}
