//! Host platform detection and the platform-to-package mapping table.
//!
//! The distribution ships one package per supported `(os, arch)` pair. This
//! module owns the fixed table and the lookup that turns the current host
//! into the identifier of the package that carries its `sqld` binary.
//!
//! OS and architecture names use the distribution's vocabulary (`darwin`,
//! `x64`, ...) rather than Rust's `std::env::consts` names, so that the
//! package directories line up with the published layout.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Scope under which the platform packages are published.
pub const PACKAGE_SCOPE: &str = "@sqld";

/// Prefix of the logical package identifier.
const PACKAGE_ID_PREFIX: &str = "pkg:";

/// The host's `(os, arch)` pair has no entry in the mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported platform: {platform}")]
pub struct UnsupportedPlatformError {
    /// The `os-arch` string that failed to resolve.
    pub platform: String,
}

/// An operating system / CPU architecture pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HostPlatform {
    os: Cow<'static, str>,
    arch: Cow<'static, str>,
}

impl HostPlatform {
    /// Build a platform pair from names already in distribution vocabulary.
    pub fn new(os: impl Into<Cow<'static, str>>, arch: impl Into<Cow<'static, str>>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detect the platform this process is running on.
    pub fn current() -> Self {
        Self::from_rust_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Translate Rust's `target_os` / `target_arch` names.
    ///
    /// Names without a known translation pass through verbatim so that the
    /// resulting error still names what the host reported.
    pub fn from_rust_consts(os: &'static str, arch: &'static str) -> Self {
        let os = match os {
            "macos" => "darwin",
            "windows" => "win32",
            other => other,
        };
        let arch = match arch {
            "aarch64" => "arm64",
            "x86_64" => "x64",
            "x86" => "ia32",
            other => other,
        };
        Self::new(os, arch)
    }

    /// Operating system name (`darwin`, `linux`, ...).
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Architecture name (`arm64`, `x64`, ...).
    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Identifier of a platform-specific distribution package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId {
    slug: &'static str,
}

impl PackageId {
    /// Logical identifier, e.g. `pkg:linux-x64`.
    pub fn name(&self) -> String {
        format!("{PACKAGE_ID_PREFIX}{}", self.slug)
    }

    /// Platform slug, e.g. `linux-x64`. Also the package directory name.
    pub const fn slug(&self) -> &'static str {
        self.slug
    }

    /// Published package name, e.g. `@sqld/linux-x64`.
    pub fn scoped_name(&self) -> String {
        format!("{PACKAGE_SCOPE}/{}", self.slug)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PACKAGE_ID_PREFIX}{}", self.slug)
    }
}

impl Serialize for PackageId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformPackage {
    /// Operating system name.
    pub os: &'static str,
    /// Architecture name.
    pub arch: &'static str,
    /// Package carrying the binary for this pair.
    pub package: PackageId,
}

/// Every supported platform and its package.
static PLATFORM_PACKAGES: [PlatformPackage; 4] = [
    PlatformPackage {
        os: "darwin",
        arch: "arm64",
        package: PackageId {
            slug: "darwin-arm64",
        },
    },
    PlatformPackage {
        os: "darwin",
        arch: "x64",
        package: PackageId { slug: "darwin-x64" },
    },
    PlatformPackage {
        os: "linux",
        arch: "arm64",
        package: PackageId {
            slug: "linux-arm64",
        },
    },
    PlatformPackage {
        os: "linux",
        arch: "x64",
        package: PackageId { slug: "linux-x64" },
    },
];

/// All entries of the mapping table, in table order.
pub fn supported_packages() -> &'static [PlatformPackage] {
    &PLATFORM_PACKAGES
}

/// Resolve the package for the current host.
pub fn resolve_package() -> Result<PackageId, UnsupportedPlatformError> {
    resolve_package_for(&HostPlatform::current())
}

/// Resolve the package for an explicit platform pair.
pub fn resolve_package_for(platform: &HostPlatform) -> Result<PackageId, UnsupportedPlatformError> {
    PLATFORM_PACKAGES
        .iter()
        .find(|entry| entry.os == platform.os() && entry.arch == platform.arch())
        .map(|entry| entry.package)
        .ok_or_else(|| UnsupportedPlatformError {
            platform: platform.to_string(),
        })
}
