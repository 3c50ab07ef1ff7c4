//! Launcher configuration from environment variables.
//!
//! All settings are optional. Unset or empty variables fall back to the
//! defaults documented on each field.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::paths::{
    InstallRoot, PathError, default_install_roots, normalize_user_path, parse_install_root_list,
};

/// Path list of install roots searched before the defaults.
pub const ENV_INSTALL_ROOT: &str = "SQLD_INSTALL_ROOT";

/// Explicit path to the `sqld` binary, bypassing package resolution.
pub const ENV_BINARY_PATH: &str = "SQLD_BINARY_PATH";

/// Default timeout in milliseconds for synchronous runs started by the CLI.
pub const ENV_TIMEOUT_MS: &str = "SQLD_TIMEOUT_MS";

/// Errors building a [`LauncherConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A path-valued variable could not be resolved.
    #[error("Invalid {var}: {source}")]
    Path {
        var: &'static str,
        #[source]
        source: PathError,
    },

    /// `SQLD_TIMEOUT_MS` is not a positive integer.
    #[error("Invalid SQLD_TIMEOUT_MS: expected milliseconds, got {value:?}")]
    InvalidTimeout { value: String },
}

/// Resolved launcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LauncherConfig {
    /// Roots from `SQLD_INSTALL_ROOT`, searched first.
    pub install_roots: Vec<InstallRoot>,

    /// Explicit binary from `SQLD_BINARY_PATH`.
    pub binary_override: Option<PathBuf>,

    /// Timeout for synchronous runs from `SQLD_TIMEOUT_MS`. `None` waits forever.
    pub default_timeout: Option<Duration>,
}

impl LauncherConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let install_roots = match non_empty(ENV_INSTALL_ROOT) {
            Some(value) => {
                parse_install_root_list(&value).map_err(|source| ConfigError::Path {
                    var: ENV_INSTALL_ROOT,
                    source,
                })?
            }
            None => Vec::new(),
        };

        let binary_override = non_empty(ENV_BINARY_PATH)
            .map(|value| normalize_user_path(&value))
            .transpose()
            .map_err(|source| ConfigError::Path {
                var: ENV_BINARY_PATH,
                source,
            })?;

        let default_timeout = non_empty(ENV_TIMEOUT_MS)
            .map(|value| match value.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
                _ => Err(ConfigError::InvalidTimeout { value }),
            })
            .transpose()?;

        Ok(Self {
            install_roots,
            binary_override,
            default_timeout,
        })
    }

    /// Full search order: configured roots, then the conventional defaults.
    pub fn search_roots(&self) -> Vec<InstallRoot> {
        let mut roots = self.install_roots.clone();
        roots.extend(default_install_roots());
        roots
    }
}
