//! Status command handler.

use anyhow::Result;
use sqld_core::HostPlatform;
use sqld_runtime::{
    BinaryLocator, InstallState, PackageStatus, SearchPathResolver, package_statuses,
    verify_binary,
};

use super::load_config;
use crate::error::CliError;

/// Print the install state of every platform package.
///
/// With `verify`, also locate the host binary and run its `--help`; a failed
/// check fails the command.
pub fn execute(verify: bool) -> Result<()> {
    let config = load_config()?;
    let host = HostPlatform::current();
    let resolver = SearchPathResolver::from_config(&config);

    let statuses = package_statuses(&resolver, &host);
    print!("{}", render(&statuses));

    if verify {
        let binary = BinaryLocator::from_config(&config)
            .locate()
            .map_err(CliError::from)?;
        let report = verify_binary(&binary).map_err(CliError::from)?;
        println!();
        println!("Health: ✓ {} ({})", report.binary.display(), report.banner);
    }

    Ok(())
}

fn render(statuses: &[PackageStatus]) -> String {
    statuses
        .iter()
        .map(|status| {
            let marker = if status.host { '*' } else { ' ' };
            let (label, detail) = describe(&status.state);
            let package = status.package.to_string();
            format!("{marker} {package:<18} {label:<15} {detail}\n")
        })
        .collect()
}

fn describe(state: &InstallState) -> (&'static str, String) {
    match state {
        InstallState::Installed { binary } => ("installed", binary.display().to_string()),
        InstallState::MissingBinary { expected } => {
            ("missing binary", expected.display().to_string())
        }
        InstallState::NotExecutable { binary } => {
            ("not executable", binary.display().to_string())
        }
        InstallState::InvalidManifest { error } => ("bad manifest", error.clone()),
        InstallState::NotInstalled => ("not installed", String::new()),
    }
}
