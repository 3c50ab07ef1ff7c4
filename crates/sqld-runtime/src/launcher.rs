//! Locator-bound entry points.

use std::ffi::OsStr;
use std::path::PathBuf;

use sqld_core::LauncherConfig;

use crate::error::SqldResult;
use crate::locate::BinaryLocator;
use crate::options::RunOptions;
use crate::process::{SqldProcess, spawn_binary};
use crate::run::{RunOutput, run_binary_sync};

/// The sqld binary behind one [`BinaryLocator`].
///
/// Every operation resolves the binary again; there is no cached path, so a
/// package installed or removed between calls is picked up.
#[derive(Debug, Clone)]
pub struct Sqld {
    locator: BinaryLocator,
}

impl Sqld {
    pub const fn new(locator: BinaryLocator) -> Self {
        Self { locator }
    }

    /// Host platform with the configured search roots and override.
    pub fn from_config(config: &LauncherConfig) -> Self {
        Self::new(BinaryLocator::from_config(config))
    }

    /// Configuration read from the process environment.
    pub fn from_env() -> SqldResult<Self> {
        Ok(Self::new(BinaryLocator::from_env()?))
    }

    pub const fn locator(&self) -> &BinaryLocator {
        &self.locator
    }

    /// Absolute path of the binary.
    pub fn locate(&self) -> SqldResult<PathBuf> {
        self.locator.locate()
    }

    /// Run to completion, capturing piped output.
    pub fn run_sync<I, S>(&self, args: I, options: &RunOptions) -> SqldResult<RunOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let binary = self.locate()?;
        run_binary_sync(&binary, args, options)
    }

    /// Start in the background. Must be called inside a Tokio runtime.
    pub fn spawn<I, S>(&self, args: I, options: &RunOptions) -> SqldResult<SqldProcess>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let binary = self.locate()?;
        spawn_binary(&binary, args, options)
    }
}

/// Locate sqld from the environment and run it to completion.
pub fn run_sync<I, S>(args: I, options: &RunOptions) -> SqldResult<RunOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Sqld::from_env()?.run_sync(args, options)
}

/// Locate sqld from the environment and start it in the background.
pub fn spawn<I, S>(args: I, options: &RunOptions) -> SqldResult<SqldProcess>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Sqld::from_env()?.spawn(args, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SqldError;
    use crate::resolver::SearchPathResolver;
    use sqld_core::HostPlatform;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn missing_binary_fails_before_spawning() {
        let root = tempdir().unwrap();
        let sqld = Sqld::new(BinaryLocator::new(
            HostPlatform::new("darwin", "x64"),
            Arc::new(SearchPathResolver::with_dirs([root.path()])),
        ));

        let err = sqld.run_sync(["--help"], &RunOptions::new()).unwrap_err();
        assert!(matches!(err, SqldError::BinaryNotFound { .. }));
    }

    #[tokio::test]
    async fn unsupported_platform_fails_spawn() {
        let root = tempdir().unwrap();
        let sqld = Sqld::new(BinaryLocator::new(
            HostPlatform::new("freebsd", "x64"),
            Arc::new(SearchPathResolver::with_dirs([root.path()])),
        ));

        let err = sqld.spawn(["--help"], &RunOptions::new()).unwrap_err();
        assert!(matches!(err, SqldError::UnsupportedPlatform(_)));
    }
}
