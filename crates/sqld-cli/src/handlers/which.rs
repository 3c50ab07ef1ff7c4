//! Which command handler.

use anyhow::Result;
use sqld_runtime::BinaryLocator;

use super::load_config;
use crate::error::CliError;

/// Print the absolute path of the sqld binary that `run` would start.
pub fn execute() -> Result<()> {
    let config = load_config()?;
    let binary = BinaryLocator::from_config(&config)
        .locate()
        .map_err(CliError::from)?;
    println!("{}", binary.display());
    Ok(())
}
