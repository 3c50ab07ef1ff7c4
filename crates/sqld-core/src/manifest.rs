//! Platform package manifest (`package.json`) reading.
//!
//! A platform package directory may carry the manifest written by the build
//! tooling. Only the fields that affect binary location are read; everything
//! else in the file is ignored.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name of the manifest inside a package directory.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Key under `bin` that names the server binary.
const BIN_KEY: &str = "sqld";

/// Errors reading a package manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest is not valid JSON or has unexpected field types.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `bin.sqld` points outside the package directory.
    #[error("{path} declares a binary outside the package: {bin}")]
    BinOutsidePackage { path: PathBuf, bin: String },
}

/// The `bin` field, which npm allows as a single path or a name map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BinField {
    /// `"bin": "sqld"`
    Single(String),
    /// `"bin": { "sqld": "sqld" }`
    Named(BTreeMap<String, String>),
}

/// The subset of `package.json` relevant to locating the binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PackageManifest {
    /// Published package name.
    pub name: Option<String>,
    /// Package version (mirrors the upstream release tag).
    pub version: Option<String>,
    /// Declared executables.
    pub bin: Option<BinField>,
    /// Operating systems the package installs on.
    pub os: Vec<String>,
    /// CPU architectures the package installs on.
    pub cpu: Vec<String>,
}

impl PackageManifest {
    /// Load the manifest from a package directory.
    ///
    /// Returns `Ok(None)` when the directory has no manifest.
    pub fn load(package_dir: &Path) -> Result<Option<Self>, ManifestError> {
        let path = package_dir.join(MANIFEST_FILE_NAME);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ManifestError::Read { path, source }),
        };

        let manifest: Self =
            serde_json::from_str(&json).map_err(|source| ManifestError::Parse {
                path: path.clone(),
                source,
            })?;

        if let Some(bin) = manifest.declared_binary() {
            if !is_contained(Path::new(bin)) {
                return Err(ManifestError::BinOutsidePackage {
                    path,
                    bin: bin.to_string(),
                });
            }
        }

        Ok(Some(manifest))
    }

    /// Relative path of the server binary declared under `bin`, if any.
    pub fn declared_binary(&self) -> Option<&str> {
        match self.bin.as_ref()? {
            BinField::Single(path) => Some(path.as_str()),
            BinField::Named(map) => map.get(BIN_KEY).map(String::as_str),
        }
    }
}

/// Whether a relative path stays inside the directory it is joined to.
fn is_contained(path: &Path) -> bool {
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    depth > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_manifest_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(PackageManifest::load(dir.path()).unwrap(), None);
    }

    #[test]
    fn named_bin_is_read() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE_NAME),
            r#"{
                "name": "@sqld/linux-x64",
                "version": "libsql-server-v0.24.32",
                "os": ["linux"],
                "cpu": ["x64"],
                "bin": { "sqld": "sqld" },
                "files": ["sqld"]
            }"#,
        )
        .unwrap();

        let manifest = PackageManifest::load(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.name.as_deref(), Some("@sqld/linux-x64"));
        assert_eq!(manifest.declared_binary(), Some("sqld"));
        assert_eq!(manifest.os, vec!["linux"]);
        assert_eq!(manifest.cpu, vec!["x64"]);
    }

    #[test]
    fn single_bin_is_read() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE_NAME),
            r#"{ "bin": "bin/sqld" }"#,
        )
        .unwrap();

        let manifest = PackageManifest::load(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.declared_binary(), Some("bin/sqld"));
    }

    #[test]
    fn other_bin_names_are_ignored() {
        let manifest = PackageManifest {
            bin: Some(BinField::Named(BTreeMap::from([(
                "other".to_string(),
                "other".to_string(),
            )]))),
            ..PackageManifest::default()
        };
        assert_eq!(manifest.declared_binary(), None);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE_NAME), "{ not json").unwrap();

        let result = PackageManifest::load(dir.path());
        assert!(matches!(result, Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn escaping_bin_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE_NAME),
            r#"{ "bin": { "sqld": "../../usr/bin/sqld" } }"#,
        )
        .unwrap();

        let result = PackageManifest::load(dir.path());
        assert!(matches!(
            result,
            Err(ManifestError::BinOutsidePackage { .. })
        ));
    }

    #[test]
    fn containment_rules() {
        assert!(is_contained(Path::new("sqld")));
        assert!(is_contained(Path::new("./bin/sqld")));
        assert!(is_contained(Path::new("bin/../sqld")));
        assert!(!is_contained(Path::new("../sqld")));
        assert!(!is_contained(Path::new("/usr/bin/sqld")));
        assert!(!is_contained(Path::new(".")));
    }
}
