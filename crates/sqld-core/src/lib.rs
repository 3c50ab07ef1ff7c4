//! Core types for the sqld platform launcher.
//!
//! This crate owns everything that can be decided without spawning a
//! process: which platform package the host needs, where installed packages
//! may live, what a package manifest declares, and how the launcher is
//! configured from the environment.
//!
//! Process location and invocation live in `sqld-runtime`.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod manifest;
pub mod paths;
pub mod platform;

// Silence unused dev-dependency warnings for crates only used in some test modules
#[cfg(test)]
use tempfile as _;

pub use config::{ConfigError, ENV_BINARY_PATH, ENV_INSTALL_ROOT, ENV_TIMEOUT_MS, LauncherConfig};
pub use manifest::{BinField, MANIFEST_FILE_NAME, ManifestError, PackageManifest};
pub use paths::{
    InstallRoot, PathError, RootSource, binary_file_name, default_install_roots,
    package_dir_candidates, parse_install_root_list,
};
pub use platform::{
    HostPlatform, PACKAGE_SCOPE, PackageId, PlatformPackage, UnsupportedPlatformError,
    resolve_package, resolve_package_for, supported_packages,
};
