//! Install-root discovery.
//!
//! An install root is a directory under which platform packages are laid out
//! (`<root>/<slug>/sqld`). Roots are searched in a fixed order:
//!
//! 1. `SQLD_INSTALL_ROOT` entries, in list order (highest priority)
//! 2. `packages/` next to the running executable
//! 3. `packages/` in the executable's parent directory
//! 4. `node_modules/` next to the running executable
//! 5. `sqld/packages` under the platform's local data directory

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::error::PathError;
use super::normalize::normalize_user_path;

/// How an install root was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootSource {
    /// Listed in `SQLD_INSTALL_ROOT`.
    EnvVar,
    /// Relative to the running executable.
    ExecutableDir,
    /// Under the platform data directory.
    DataDir,
}

impl fmt::Display for RootSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EnvVar => "env",
            Self::ExecutableDir => "executable",
            Self::DataDir => "data-dir",
        };
        f.write_str(label)
    }
}

/// A directory searched for platform packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallRoot {
    /// The root directory.
    pub path: PathBuf,
    /// How the root was determined.
    pub source: RootSource,
}

impl InstallRoot {
    /// Create an install root.
    pub fn new(path: PathBuf, source: RootSource) -> Self {
        Self { path, source }
    }
}

impl fmt::Display for InstallRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.source)
    }
}

/// Parse an install-root list in the platform's path-list syntax.
///
/// Empty entries are skipped. An entry that exists but is not a directory is
/// rejected rather than silently ignored.
pub fn parse_install_root_list(value: &str) -> Result<Vec<InstallRoot>, PathError> {
    let mut roots = Vec::new();
    for entry in env::split_paths(value) {
        let raw = entry.to_string_lossy();
        if raw.trim().is_empty() {
            continue;
        }
        let path = normalize_user_path(&raw)?;
        if path.exists() && !path.is_dir() {
            return Err(PathError::NotADirectory(path));
        }
        roots.push(InstallRoot::new(path, RootSource::EnvVar));
    }
    Ok(roots)
}

/// Roots derived from the location of an executable.
pub fn executable_roots(exe: &Path) -> Vec<InstallRoot> {
    let Some(dir) = exe.parent() else {
        return Vec::new();
    };

    let mut roots = vec![InstallRoot::new(
        dir.join("packages"),
        RootSource::ExecutableDir,
    )];
    if let Some(parent) = dir.parent() {
        roots.push(InstallRoot::new(
            parent.join("packages"),
            RootSource::ExecutableDir,
        ));
    }
    roots.push(InstallRoot::new(
        dir.join("node_modules"),
        RootSource::ExecutableDir,
    ));
    roots
}

/// Root under the platform's local data directory, if one exists.
pub fn data_dir_root() -> Option<InstallRoot> {
    dirs::data_local_dir()
        .map(|dir| InstallRoot::new(dir.join("sqld").join("packages"), RootSource::DataDir))
}

/// The conventional roots searched after any explicit override.
pub fn default_install_roots() -> Vec<InstallRoot> {
    let mut roots = match env::current_exe() {
        Ok(exe) => {
            let exe = exe.canonicalize().unwrap_or(exe);
            executable_roots(&exe)
        }
        Err(e) => {
            debug!("Cannot determine current executable, skipping exe-relative roots: {e}");
            Vec::new()
        }
    };
    roots.extend(data_dir_root());
    roots
}
