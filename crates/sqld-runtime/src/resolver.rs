//! Package directory resolution.
//!
//! The locator does not know where packages are installed; it asks a
//! [`PackageDirResolver`]. The default [`SearchPathResolver`] walks a list of
//! install roots in order and returns the first package directory that
//! exists. Callers with their own layout implement the trait instead.

use std::fmt;
use std::path::PathBuf;

use sqld_core::{InstallRoot, LauncherConfig, PackageId, RootSource, package_dir_candidates};
use tracing::debug;

/// Maps a package identifier to its install directory.
pub trait PackageDirResolver: fmt::Debug + Send + Sync {
    /// Every directory that may hold `package`, in search order.
    fn candidates(&self, package: &PackageId) -> Vec<PathBuf>;

    /// The first candidate that exists as a directory.
    fn resolve(&self, package: &PackageId) -> Option<PathBuf> {
        self.candidates(package).into_iter().find(|dir| {
            let found = dir.is_dir();
            debug!(package = %package, dir = %dir.display(), found, "probing package directory");
            found
        })
    }
}

/// Searches an ordered list of install roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPathResolver {
    roots: Vec<InstallRoot>,
}

impl SearchPathResolver {
    /// Search exactly the given roots.
    pub const fn new(roots: Vec<InstallRoot>) -> Self {
        Self { roots }
    }

    /// Search plain directories, in order.
    pub fn with_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(
            dirs.into_iter()
                .map(|dir| InstallRoot::new(dir.into(), RootSource::EnvVar))
                .collect(),
        )
    }

    /// Configured roots followed by the conventional defaults.
    pub fn from_config(config: &LauncherConfig) -> Self {
        Self::new(config.search_roots())
    }

    /// The roots searched, in order.
    pub fn roots(&self) -> &[InstallRoot] {
        &self.roots
    }
}

impl PackageDirResolver for SearchPathResolver {
    fn candidates(&self, package: &PackageId) -> Vec<PathBuf> {
        self.roots
            .iter()
            .flat_map(|root| package_dir_candidates(&root.path, package))
            .collect()
    }
}
