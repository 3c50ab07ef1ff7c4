//! sqld binary location.
//!
//! Resolution applies the following precedence order:
//! 1. `SQLD_BINARY_PATH` environment variable (explicit override)
//! 2. The host's platform package, found through a [`PackageDirResolver`]
//!
//! In both cases the final path must exist and be a regular file. Nothing is
//! cached; each call resolves independently.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqld_core::{
    HostPlatform, LauncherConfig, PackageId, PackageManifest, binary_file_name, resolve_package_for,
};
use tracing::debug;

use crate::error::{SqldError, SqldResult};
use crate::resolver::{PackageDirResolver, SearchPathResolver};

/// Finds the sqld binary for one platform through one resolver.
#[derive(Debug, Clone)]
pub struct BinaryLocator {
    platform: HostPlatform,
    resolver: Arc<dyn PackageDirResolver>,
    binary_override: Option<PathBuf>,
}

impl BinaryLocator {
    /// Locate binaries for `platform` using `resolver`.
    pub fn new(platform: HostPlatform, resolver: Arc<dyn PackageDirResolver>) -> Self {
        Self {
            platform,
            resolver,
            binary_override: None,
        }
    }

    /// Host platform, configured search roots and binary override.
    pub fn from_config(config: &LauncherConfig) -> Self {
        Self {
            platform: HostPlatform::current(),
            resolver: Arc::new(SearchPathResolver::from_config(config)),
            binary_override: config.binary_override.clone(),
        }
    }

    /// Same as [`from_config`](Self::from_config) with the process environment.
    pub fn from_env() -> SqldResult<Self> {
        Ok(Self::from_config(&LauncherConfig::from_env()?))
    }

    /// Use this binary instead of resolving a package.
    #[must_use]
    pub fn with_binary_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_override = Some(path.into());
        self
    }

    /// The platform this locator resolves for.
    pub const fn platform(&self) -> &HostPlatform {
        &self.platform
    }

    /// The package directory resolver in use.
    pub fn resolver(&self) -> &dyn PackageDirResolver {
        self.resolver.as_ref()
    }

    /// The package for this locator's platform.
    pub fn package(&self) -> SqldResult<PackageId> {
        Ok(resolve_package_for(&self.platform)?)
    }

    /// Resolve the absolute path of the sqld binary.
    pub fn locate(&self) -> SqldResult<PathBuf> {
        if let Some(path) = &self.binary_override {
            debug!("Using sqld from SQLD_BINARY_PATH: {}", path.display());
            if is_regular_file(path) {
                return Ok(path.clone());
            }
            return Err(SqldError::OverrideNotFound { path: path.clone() });
        }

        let package = self.package()?;

        let Some(package_dir) = self.resolver.resolve(&package) else {
            let expected = self
                .resolver
                .candidates(&package)
                .into_iter()
                .next()
                .map_or_else(
                    || PathBuf::from(binary_file_name()),
                    |dir| dir.join(binary_file_name()),
                );
            return Err(SqldError::BinaryNotFound {
                path: expected,
                package,
            });
        };

        let path = binary_in_package(&package_dir)?;
        if !is_regular_file(&path) {
            return Err(SqldError::BinaryNotFound { path, package });
        }

        debug!(package = %package, binary = %path.display(), "located sqld");
        Ok(path)
    }
}

/// Locate the sqld binary for the current host and environment.
pub fn locate_binary() -> SqldResult<PathBuf> {
    BinaryLocator::from_env()?.locate()
}

/// Expected binary path inside a package directory.
///
/// Honours `bin.sqld` from the package manifest, falling back to the
/// platform's default binary name.
pub(crate) fn binary_in_package(package_dir: &Path) -> SqldResult<PathBuf> {
    let declared = PackageManifest::load(package_dir)?
        .and_then(|manifest| manifest.declared_binary().map(PathBuf::from));

    let relative = declared.unwrap_or_else(|| PathBuf::from(binary_file_name()));
    Ok(package_dir.join(relative))
}

/// Regular file after following symlinks.
fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|metadata| metadata.is_file())
}
