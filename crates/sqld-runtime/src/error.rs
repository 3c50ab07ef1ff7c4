//! Error types for locating and invoking the sqld binary.
//!
//! Every failure is surfaced to the caller with enough detail (platform,
//! attempted path, exit code, captured output) to act on. Nothing here is
//! retried internally.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use sqld_core::{ConfigError, ManifestError, PackageId, UnsupportedPlatformError};
use thiserror::Error;

/// Errors that can occur when locating or running the sqld binary.
#[derive(Debug, Error)]
pub enum SqldError {
    // === Location ===
    /// The host `(os, arch)` pair has no platform package.
    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatformError),

    /// The platform package resolved but holds no binary at the expected path.
    #[error(
        "sqld binary not found at: {path}\n\nMake sure {} ({package}) is installed.",
        .package.scoped_name()
    )]
    BinaryNotFound {
        /// The path where the binary was expected
        path: PathBuf,
        /// The package that should have provided it
        package: PackageId,
    },

    /// `SQLD_BINARY_PATH` points at something that is not a file.
    #[error("SQLD_BINARY_PATH does not point to a file: {path}")]
    OverrideNotFound {
        /// The configured path
        path: PathBuf,
    },

    /// The package manifest could not be used.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Launcher configuration from the environment is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    // === Invocation ===
    /// The binary was found but the OS refused to start it.
    #[error("Failed to spawn {path}: {source}")]
    Spawn {
        /// The binary that failed to start
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The binary ran but did not succeed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The binary's `--help` output does not identify it as sqld.
    #[error("{path} does not look like sqld: {excerpt}")]
    VerificationFailed {
        /// The binary that was checked
        path: PathBuf,
        /// Start of the output it produced
        excerpt: String,
    },

    /// IO failure while waiting on or reading from the child.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SqldError {
    /// Exit code of a failed run, if the binary ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Execution(err) => err.exit_code(),
            _ => None,
        }
    }

    /// Whether this is a synchronous run that exceeded its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Execution(err) if err.is_timeout())
    }
}

/// Result type alias for sqld operations.
pub type SqldResult<T> = Result<T, SqldError>;

/// How a synchronous run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionFailure {
    /// The process exited unsuccessfully. `None` means it was killed by a signal.
    Exited { code: Option<i32> },
    /// The timeout elapsed; the process was killed.
    TimedOut { after: Duration },
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited { code: Some(code) } => write!(f, "exited with code {code}"),
            Self::Exited { code: None } => f.write_str("was terminated by a signal"),
            Self::TimedOut { after } => write!(f, "timed out after {}ms", after.as_millis()),
        }
    }
}

/// A synchronous run that exited non-zero or timed out.
#[derive(Debug, Error)]
pub struct ExecutionError {
    /// The binary that was run
    pub path: PathBuf,
    /// Exit code or timeout marker
    pub failure: ExecutionFailure,
    /// Captured standard output (empty if not piped)
    pub stdout: Vec<u8>,
    /// Captured standard error (empty if not piped)
    pub stderr: Vec<u8>,
}

impl ExecutionError {
    /// Exit code, if the process exited on its own.
    pub const fn exit_code(&self) -> Option<i32> {
        match self.failure {
            ExecutionFailure::Exited { code } => code,
            ExecutionFailure::TimedOut { .. } => None,
        }
    }

    /// Whether the run was killed for exceeding its timeout.
    pub const fn is_timeout(&self) -> bool {
        matches!(self.failure, ExecutionFailure::TimedOut { .. })
    }

    /// Captured standard output as text.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Captured standard error as text.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path.display(), self.failure)?;
        let stderr = String::from_utf8_lossy(&self.stderr);
        if let Some(line) = stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            write!(f, ": {}", line.trim())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqld_core::{HostPlatform, resolve_package_for};

    fn failed(failure: ExecutionFailure, stderr: &str) -> ExecutionError {
        ExecutionError {
            path: PathBuf::from("/pkgs/linux-x64/sqld"),
            failure,
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn exit_code_is_exposed() {
        let err = SqldError::from(failed(ExecutionFailure::Exited { code: Some(3) }, ""));
        assert_eq!(err.exit_code(), Some(3));
        assert!(!err.is_timeout());
    }

    #[test]
    fn timeout_has_no_exit_code() {
        let err = SqldError::from(failed(
            ExecutionFailure::TimedOut {
                after: Duration::from_millis(50),
            },
            "",
        ));
        assert_eq!(err.exit_code(), None);
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "/pkgs/linux-x64/sqld timed out after 50ms");
    }

    #[test]
    fn display_includes_last_stderr_line() {
        let err = failed(
            ExecutionFailure::Exited { code: Some(1) },
            "warming up\nerror: bad flag\n\n",
        );
        assert_eq!(
            err.to_string(),
            "/pkgs/linux-x64/sqld exited with code 1: error: bad flag"
        );
    }

    #[test]
    fn not_found_names_path_and_package() {
        let package = resolve_package_for(&HostPlatform::new("darwin", "arm64")).unwrap();
        let err = SqldError::BinaryNotFound {
            path: PathBuf::from("/pkgs/darwin-arm64/sqld"),
            package,
        };
        let message = err.to_string();
        assert!(message.contains("/pkgs/darwin-arm64/sqld"));
        assert!(message.contains("@sqld/darwin-arm64"));
        assert!(message.contains("pkg:darwin-arm64"));
    }

    #[test]
    fn unsupported_platform_is_passed_through() {
        let err: SqldError = resolve_package_for(&HostPlatform::new("win32", "x64"))
            .unwrap_err()
            .into();
        assert_eq!(err.to_string(), "Unsupported platform: win32-x64");
    }
}
