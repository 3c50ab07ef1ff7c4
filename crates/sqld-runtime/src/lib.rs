//! Locate and invoke the platform-specific sqld binary.
//!
//! Resolution is delegated to `sqld-core`; this crate turns the resolved
//! package into a binary path and runs it, either to completion
//! ([`run_sync`]) or in the background ([`spawn`]).
//!
//! ```no_run
//! use sqld_runtime::{RunOptions, run_sync};
//!
//! let output = run_sync(["--version"], &RunOptions::new())?;
//! println!("{}", output.stdout_lossy());
//! # Ok::<(), sqld_runtime::SqldError>(())
//! ```

pub mod error;
mod launcher;
pub mod locate;
pub mod options;
pub mod process;
pub mod resolver;
pub mod run;
pub mod verify;

pub use error::{ExecutionError, ExecutionFailure, SqldError, SqldResult};
pub use launcher::{Sqld, run_sync, spawn};
pub use locate::{BinaryLocator, locate_binary};
pub use options::{RunOptions, StdioMode};
pub use process::{DEFAULT_GRACE_PERIOD, SqldProcess, shutdown_child, spawn_binary};
pub use resolver::{PackageDirResolver, SearchPathResolver};
pub use run::{DRAIN_AFTER_KILL, RunOutput, run_binary_sync};
pub use verify::{
    InstallState, PackageStatus, VERIFY_TIMEOUT, VerifyReport, package_statuses, verify_binary,
};

pub use sqld_core::{HostPlatform, PackageId, resolve_package};

#[cfg(unix)]
pub use nix::sys::signal::Signal;
