//! Serve command handler.

use std::time::Duration;

use anyhow::Result;
use sqld_runtime::{RunOptions, Sqld};
use tracing::info;

use super::{apply_launch_args, load_config};
use crate::commands::LaunchArgs;
use crate::error::CliError;

/// Start sqld with inherited stdio and wait for it.
///
/// sqld stays in the launcher's process group like any foreground job. Ctrl-C
/// sends SIGTERM and waits up to `grace_secs` before killing. The launcher
/// exits with sqld's exit code.
pub async fn execute(grace_secs: u64, launch: &LaunchArgs, args: Vec<String>) -> Result<()> {
    let config = load_config()?;
    let base = RunOptions::new()
        .inherit_stdio()
        .kill_on_drop(true)
        .process_group(false);
    let options = apply_launch_args(base, launch);

    let mut process = Sqld::from_config(&config)
        .spawn(&args, &options)
        .map_err(CliError::from)?;
    info!(pid = ?process.id(), binary = %process.path().display(), "sqld started");

    let status = tokio::select! {
        status = process.wait() => status.map_err(CliError::from)?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, stopping sqld");
            process
                .terminate(Duration::from_secs(grace_secs))
                .await
                .map_err(CliError::from)?
        }
    };

    match CliError::from_exit_status(status) {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
