//! Install verification and status reporting.
//!
//! [`verify_binary`] is a smoke test: run `--help` and check that the
//! output identifies sqld. [`package_statuses`] walks the platform table and
//! reports what is installed for each package without running anything.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use sqld_core::{HostPlatform, PackageId, supported_packages};
use tracing::{debug, warn};

use crate::error::{SqldError, SqldResult};
use crate::locate::binary_in_package;
use crate::options::{RunOptions, StdioMode};
use crate::resolver::PackageDirResolver;
use crate::run::run_binary_sync;

/// Deadline for the `--help` smoke test.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Words that identify sqld's help output.
const HELP_MARKERS: [&str; 2] = ["sqld", "libsql"];

/// Maximum number of characters of unexpected output kept in errors.
const EXCERPT_LEN: usize = 100;

/// Result of a successful [`verify_binary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// The binary that was checked
    pub binary: PathBuf,
    /// First non-empty line of its help output
    pub banner: String,
}

/// Run `<binary> --help` and check the output mentions sqld or libsql.
///
/// Fails with the usual run errors when the binary cannot start, exits
/// non-zero or takes longer than [`VERIFY_TIMEOUT`].
pub fn verify_binary(binary: &Path) -> SqldResult<VerifyReport> {
    let options = RunOptions::new()
        .stdin(StdioMode::Null)
        .timeout(VERIFY_TIMEOUT);
    let output = run_binary_sync(binary, ["--help"], &options)?;

    let mut text = output.stdout_lossy();
    text.push_str(&output.stderr_lossy());

    if !HELP_MARKERS.iter().any(|marker| text.contains(marker)) {
        warn!(binary = %binary.display(), "help output does not mention sqld");
        return Err(SqldError::VerificationFailed {
            path: binary.to_path_buf(),
            excerpt: text.chars().take(EXCERPT_LEN).collect(),
        });
    }

    let banner = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();

    debug!(binary = %binary.display(), %banner, "sqld binary verified");
    Ok(VerifyReport {
        binary: binary.to_path_buf(),
        banner,
    })
}

/// What is on disk for one platform package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InstallState {
    /// Package directory and binary present
    Installed { binary: PathBuf },
    /// Package directory present, binary missing
    MissingBinary { expected: PathBuf },
    /// Binary present without any execute bit
    NotExecutable { binary: PathBuf },
    /// Package manifest unreadable or invalid
    InvalidManifest { error: String },
    /// No package directory in any search root
    NotInstalled,
}

impl InstallState {
    pub const fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }
}

/// Install status of one platform package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageStatus {
    pub os: &'static str,
    pub arch: &'static str,
    pub package: PackageId,
    /// Whether this is the package for the running host
    pub host: bool,
    #[serde(flatten)]
    pub state: InstallState,
}

/// Report the install state of every supported package, in table order.
pub fn package_statuses(
    resolver: &dyn PackageDirResolver,
    host: &HostPlatform,
) -> Vec<PackageStatus> {
    supported_packages()
        .iter()
        .map(|entry| PackageStatus {
            os: entry.os,
            arch: entry.arch,
            package: entry.package,
            host: entry.os == host.os() && entry.arch == host.arch(),
            state: install_state(resolver, &entry.package),
        })
        .collect()
}

fn install_state(resolver: &dyn PackageDirResolver, package: &PackageId) -> InstallState {
    let Some(dir) = resolver.resolve(package) else {
        return InstallState::NotInstalled;
    };

    let binary = match binary_in_package(&dir) {
        Ok(binary) => binary,
        Err(e) => {
            return InstallState::InvalidManifest {
                error: e.to_string(),
            };
        }
    };

    match fs::metadata(&binary) {
        Ok(metadata) if metadata.is_file() => {
            if is_executable(&metadata) {
                InstallState::Installed { binary }
            } else {
                InstallState::NotExecutable { binary }
            }
        }
        _ => InstallState::MissingBinary { expected: binary },
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::SearchPathResolver;
    use sqld_core::binary_file_name;
    use tempfile::tempdir;

    #[test]
    fn every_package_is_reported() {
        let root = tempdir().unwrap();
        let resolver = SearchPathResolver::with_dirs([root.path()]);

        let statuses = package_statuses(&resolver, &HostPlatform::new("linux", "x64"));
        assert_eq!(statuses.len(), 4);
        assert!(
            statuses
                .iter()
                .all(|s| s.state == InstallState::NotInstalled)
        );
        let host: Vec<_> = statuses.iter().filter(|s| s.host).collect();
        assert_eq!(host.len(), 1);
        assert_eq!(host[0].package.slug(), "linux-x64");
    }

    #[test]
    fn unsupported_host_marks_nothing() {
        let root = tempdir().unwrap();
        let resolver = SearchPathResolver::with_dirs([root.path()]);

        let statuses = package_statuses(&resolver, &HostPlatform::new("win32", "x64"));
        assert!(statuses.iter().all(|s| !s.host));
    }

    #[test]
    fn empty_package_dir_is_missing_binary() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("darwin-arm64")).unwrap();
        let resolver = SearchPathResolver::with_dirs([root.path()]);

        let statuses = package_statuses(&resolver, &HostPlatform::new("linux", "x64"));
        let darwin = statuses
            .iter()
            .find(|s| s.package.slug() == "darwin-arm64")
            .unwrap();
        assert_eq!(
            darwin.state,
            InstallState::MissingBinary {
                expected: root.path().join("darwin-arm64").join(binary_file_name())
            }
        );
    }

    #[test]
    fn bad_manifest_is_reported() {
        let root = tempdir().unwrap();
        let dir = root.path().join("linux-arm64");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), "{ not json").unwrap();
        let resolver = SearchPathResolver::with_dirs([root.path()]);

        let statuses = package_statuses(&resolver, &HostPlatform::new("linux", "arm64"));
        let linux = statuses.iter().find(|s| s.host).unwrap();
        assert_eq!(linux.package.slug(), "linux-arm64");
        assert!(matches!(linux.state, InstallState::InvalidManifest { .. }));
    }

    #[test]
    fn state_serializes_with_tag() {
        let status = PackageStatus {
            os: "linux",
            arch: "x64",
            package: resolve_linux_x64(),
            host: true,
            state: InstallState::NotInstalled,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "not_installed");
        assert_eq!(json["package"], "pkg:linux-x64");
        assert_eq!(json["host"], true);
    }

    fn resolve_linux_x64() -> PackageId {
        sqld_core::resolve_package_for(&HostPlatform::new("linux", "x64")).unwrap()
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn stub(dir: &Path, body: &str, mode: u32) -> PathBuf {
            fs::create_dir_all(dir).unwrap();
            let path = dir.join("sqld");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
            path
        }

        #[test]
        fn help_mentioning_sqld_passes() {
            let dir = tempdir().unwrap();
            let body = "echo 'sqld 0.24.0'; echo 'usage: sqld [OPTIONS]'";
            let binary = stub(dir.path(), body, 0o755);

            let report = verify_binary(&binary).unwrap();
            assert_eq!(report.banner, "sqld 0.24.0");
            assert_eq!(report.binary, binary);
        }

        #[test]
        fn libsql_on_stderr_passes() {
            let dir = tempdir().unwrap();
            let binary = stub(dir.path(), "echo 'libsql server' >&2", 0o755);

            assert!(verify_binary(&binary).is_ok());
        }

        #[test]
        fn unrelated_output_fails() {
            let dir = tempdir().unwrap();
            let binary = stub(dir.path(), "echo 'hello world'", 0o755);

            match verify_binary(&binary).unwrap_err() {
                SqldError::VerificationFailed { excerpt, .. } => {
                    assert_eq!(excerpt, "hello world\n");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn failing_help_is_an_execution_error() {
            let dir = tempdir().unwrap();
            let binary = stub(dir.path(), "echo sqld; exit 2", 0o755);

            let err = verify_binary(&binary).unwrap_err();
            assert_eq!(err.exit_code(), Some(2));
        }

        #[test]
        fn installed_and_not_executable_states() {
            let root = tempdir().unwrap();
            let good = stub(&root.path().join("linux-x64"), "echo sqld", 0o755);
            let bad = stub(&root.path().join("darwin-x64"), "echo sqld", 0o644);
            let resolver = SearchPathResolver::with_dirs([root.path()]);

            let statuses = package_statuses(&resolver, &HostPlatform::new("linux", "x64"));
            let state_of = |slug: &str| {
                statuses
                    .iter()
                    .find(|s| s.package.slug() == slug)
                    .map(|s| s.state.clone())
                    .unwrap()
            };
            assert_eq!(state_of("linux-x64"), InstallState::Installed { binary: good });
            assert_eq!(state_of("darwin-x64"), InstallState::NotExecutable { binary: bad });
            assert!(state_of("linux-x64").is_installed());
        }
    }
}
