//! Command handlers.
//!
//! Each handler is a thin wrapper: read configuration, call into
//! `sqld-runtime`, format the result for the terminal. Failures are returned
//! as [`CliError`] wrapped in `anyhow` so `main` can pick the exit code.

pub mod paths;
pub mod platform;
pub mod run;
pub mod serve;
pub mod status;
pub mod which;

use anyhow::Result;
use sqld_core::LauncherConfig;
use sqld_runtime::RunOptions;

use crate::commands::{Commands, LaunchArgs};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Platform { json } => platform::execute(json),
        Commands::Which => which::execute(),
        Commands::Paths => paths::execute(),
        Commands::Status { verify } => status::execute(verify),
        Commands::Run {
            timeout_ms,
            launch,
            args,
        } => run::execute(timeout_ms, &launch, args).await,
        Commands::Serve {
            grace_secs,
            launch,
            args,
        } => serve::execute(grace_secs, &launch, args).await,
    }
}

/// Launcher configuration from the environment.
pub(crate) fn load_config() -> Result<LauncherConfig, CliError> {
    Ok(LauncherConfig::from_env()?)
}

/// Apply `--cwd` and `--env` on top of `options`.
pub(crate) fn apply_launch_args(mut options: RunOptions, launch: &LaunchArgs) -> RunOptions {
    if let Some(dir) = &launch.cwd {
        options = options.current_dir(dir);
    }
    options.envs(launch.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn launch_args_map_onto_options() {
        let launch = LaunchArgs {
            cwd: Some(PathBuf::from("/srv/sqld")),
            env: vec![("SQLD_NODE".to_string(), "primary".to_string())],
        };
        let options = apply_launch_args(RunOptions::new(), &launch);

        assert_eq!(options.working_dir, Some(PathBuf::from("/srv/sqld")));
        assert_eq!(
            options.env,
            [(OsString::from("SQLD_NODE"), OsString::from("primary"))]
        );
    }

    #[test]
    fn empty_launch_args_change_nothing() {
        let options = apply_launch_args(RunOptions::new(), &LaunchArgs::default());
        assert_eq!(options.working_dir, None);
        assert!(options.env.is_empty());
    }
}
