//! Binary and package directory naming inside an install root.

use std::path::{Path, PathBuf};

use crate::platform::{PACKAGE_SCOPE, PackageId};

/// File name of the server binary on this platform.
pub const fn binary_file_name() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "sqld.exe"
    }

    #[cfg(not(target_os = "windows"))]
    {
        "sqld"
    }
}

/// Directories under `root` that may hold `package`, most specific first.
///
/// Covers a flat `packages/<slug>` layout as produced by the build tooling
/// and the scoped `node_modules/@sqld/<slug>` layout of an npm install.
pub fn package_dir_candidates(root: &Path, package: &PackageId) -> Vec<PathBuf> {
    vec![
        root.join(package.slug()),
        root.join(PACKAGE_SCOPE).join(package.slug()),
        root.join("node_modules").join(PACKAGE_SCOPE).join(package.slug()),
    ]
}
