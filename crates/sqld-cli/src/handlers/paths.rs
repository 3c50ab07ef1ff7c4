//! Paths command handler.
//!
//! Displays the launcher's search configuration for diagnosing "binary not
//! found" reports.

use std::fmt;

use anyhow::Result;
use sqld_core::{HostPlatform, InstallRoot, LauncherConfig, resolve_package_for};

use super::load_config;

/// Everything that decides which binary gets picked.
struct SearchReport {
    platform: HostPlatform,
    config: LauncherConfig,
    roots: Vec<InstallRoot>,
}

impl SearchReport {
    fn new(platform: HostPlatform, config: LauncherConfig) -> Self {
        let roots = config.search_roots();
        Self {
            platform,
            config,
            roots,
        }
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "platform = {}", self.platform)?;
        match resolve_package_for(&self.platform) {
            Ok(package) => writeln!(f, "package = {package}")?,
            Err(_) => writeln!(f, "package = <unsupported>")?,
        }
        match &self.config.binary_override {
            Some(path) => writeln!(f, "binary_override = {}", path.display())?,
            None => writeln!(f, "binary_override = <unset>")?,
        }
        match self.config.default_timeout {
            Some(timeout) => writeln!(f, "default_timeout_ms = {}", timeout.as_millis())?,
            None => writeln!(f, "default_timeout_ms = <unset>")?,
        }
        for (index, root) in self.roots.iter().enumerate() {
            write!(f, "\ninstall_root.{index} = {root}")?;
        }
        Ok(())
    }
}

/// Execute the paths command.
///
/// Prints the host platform, any override, and the install roots in search
/// order, one `key = value` per line.
pub fn execute() -> Result<()> {
    let config = load_config()?;
    let report = SearchReport::new(HostPlatform::current(), config);
    println!("{report}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqld_core::RootSource;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn report_lists_config_then_roots() {
        let config = LauncherConfig {
            install_roots: vec![InstallRoot::new(
                PathBuf::from("/opt/sqld"),
                RootSource::EnvVar,
            )],
            binary_override: Some(PathBuf::from("/usr/local/bin/sqld")),
            default_timeout: Some(Duration::from_millis(1500)),
        };
        let output = SearchReport::new(HostPlatform::new("linux", "arm64"), config).to_string();

        assert!(output.starts_with("platform = linux-arm64\npackage = pkg:linux-arm64\n"));
        assert!(output.contains("binary_override = /usr/local/bin/sqld\n"));
        assert!(output.contains("default_timeout_ms = 1500\n"));
        assert!(output.contains("install_root.0 = /opt/sqld (env)"));
    }

    #[test]
    fn unsupported_platform_is_shown_not_fatal() {
        let output =
            SearchReport::new(HostPlatform::new("win32", "x64"), LauncherConfig::default())
                .to_string();

        assert!(output.contains("package = <unsupported>"));
        assert!(output.contains("binary_override = <unset>"));
    }
}
