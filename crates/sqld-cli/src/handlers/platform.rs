//! Platform command handler.

use anyhow::Result;
use serde_json::json;
use sqld_core::{HostPlatform, PackageId, resolve_package_for};
use sqld_runtime::SqldError;

use crate::error::CliError;

/// Print the host platform and its package.
pub fn execute(json: bool) -> Result<()> {
    let host = HostPlatform::current();
    let package = resolve_package_for(&host).map_err(|e| CliError::from(SqldError::from(e)))?;
    println!("{}", render(&host, package, json));
    Ok(())
}

fn render(host: &HostPlatform, package: PackageId, json: bool) -> String {
    if json {
        json!({
            "os": host.os(),
            "arch": host.arch(),
            "platform": host.to_string(),
            "package": package,
            "scoped_name": package.scoped_name(),
        })
        .to_string()
    } else {
        format!("{host} -> {package} ({})", package.scoped_name())
    }
}
