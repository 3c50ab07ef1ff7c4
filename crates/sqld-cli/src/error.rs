//! CLI-specific error types and mappings.
//!
//! Maps launcher errors onto process exit codes. A failing sqld run passes
//! its own exit code through; everything else uses sysexits.h values.

use std::process::ExitStatus;

use sqld_core::ConfigError;
use sqld_runtime::{ExecutionFailure, SqldError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// No usable sqld for this host (unsupported platform, package missing).
    #[error("{0}")]
    Unavailable(String),

    /// Launcher configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// sqld could not be started or waited on.
    #[error("Process error: {0}")]
    Process(String),

    /// IO error while relaying output.
    #[error("IO error: {0}")]
    Io(String),

    /// sqld ran past its timeout and was killed.
    #[error("{0}")]
    TimedOut(String),

    /// sqld exited unsuccessfully.
    #[error("sqld exited with code {code}")]
    ChildExited { code: i32 },

    /// The binary failed the `--help` smoke test.
    #[error("Verification failed: {0}")]
    Verification(String),
}

impl CliError {
    /// Map error to the process exit code.
    ///
    /// - `ChildExited`: the child's own code
    /// - 69: sqld unavailable (`EX_UNAVAILABLE`)
    /// - 70: verification failed (`EX_SOFTWARE`)
    /// - 71: process error (`EX_OSERR`)
    /// - 74: IO error (`EX_IOERR`)
    /// - 75: timed out (`EX_TEMPFAIL`)
    /// - 78: configuration error (`EX_CONFIG`)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ChildExited { code } => *code,
            Self::Unavailable(_) => 69,
            Self::Verification(_) => 70,
            Self::Process(_) => 71,
            Self::Io(_) => 74,
            Self::TimedOut(_) => 75,
            Self::Config(_) => 78,
        }
    }

    /// Error for a child that finished with `status`, or `None` on success.
    ///
    /// A child killed by a signal maps to `128 + signal`, the shell convention.
    pub fn from_exit_status(status: ExitStatus) -> Option<Self> {
        if status.success() {
            return None;
        }
        Some(Self::ChildExited {
            code: status_code(status),
        })
    }
}

#[cfg(unix)]
fn status_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn status_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

impl From<SqldError> for CliError {
    fn from(err: SqldError) -> Self {
        match err {
            SqldError::UnsupportedPlatform(_)
            | SqldError::BinaryNotFound { .. }
            | SqldError::OverrideNotFound { .. } => Self::Unavailable(err.to_string()),
            SqldError::Manifest(_) | SqldError::Config(_) => Self::Config(err.to_string()),
            SqldError::Spawn { .. } => Self::Process(err.to_string()),
            SqldError::Execution(ref exec) => match exec.failure {
                ExecutionFailure::Exited { code: Some(code) } => Self::ChildExited { code },
                ExecutionFailure::Exited { code: None } => Self::Process(err.to_string()),
                ExecutionFailure::TimedOut { .. } => Self::TimedOut(err.to_string()),
            },
            SqldError::VerificationFailed { .. } => Self::Verification(err.to_string()),
            SqldError::Io(e) => Self::Io(e.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
