//! Run command handler.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use sqld_runtime::{RunOptions, Sqld, SqldError, StdioMode};

use super::{apply_launch_args, load_config};
use crate::commands::LaunchArgs;
use crate::error::CliError;

/// Run sqld to completion, then relay its captured stdout and stderr.
///
/// The child's stdin is the launcher's and it stays in the launcher's
/// process group, so Ctrl-C at the terminal reaches it. On a non-zero exit
/// the captured output is still relayed before the exit code is passed on.
pub async fn execute(
    timeout_ms: Option<u64>,
    launch: &LaunchArgs,
    args: Vec<String>,
) -> Result<()> {
    let config = load_config()?;
    let timeout = timeout_ms.map(Duration::from_millis).or(config.default_timeout);

    let base = RunOptions::new()
        .stdin(StdioMode::Inherit)
        .process_group(false);
    let mut options = apply_launch_args(base, launch);
    if let Some(timeout) = timeout {
        options = options.timeout(timeout);
    }

    let sqld = Sqld::from_config(&config);
    let result = tokio::task::spawn_blocking(move || sqld.run_sync(&args, &options))
        .await
        .context("sqld runner task failed")?;

    match result {
        Ok(output) => {
            relay(&output.stdout, &output.stderr)?;
            Ok(())
        }
        Err(SqldError::Execution(exec)) => {
            relay(&exec.stdout, &exec.stderr)?;
            Err(CliError::from(SqldError::Execution(exec)).into())
        }
        Err(err) => Err(CliError::from(err).into()),
    }
}

fn relay(stdout: &[u8], stderr: &[u8]) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    out.write_all(stdout)?;
    out.flush()?;
    let mut err = io::stderr().lock();
    err.write_all(stderr)?;
    err.flush()?;
    Ok(())
}
