//! Subcommands of the launcher.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the host platform and the package it maps to
    Platform {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the path of the sqld binary that would be run
    Which,

    /// Show the install roots searched, in order
    Paths,

    /// Report which platform packages are installed
    Status {
        /// Also run the host binary's --help as a smoke test
        #[arg(long)]
        verify: bool,
    },

    /// Run sqld to completion and relay its output
    Run {
        /// Kill sqld if it runs longer than this (defaults to SQLD_TIMEOUT_MS)
        #[arg(long = "timeout-ms", value_name = "MS")]
        timeout_ms: Option<u64>,

        #[command(flatten)]
        launch: LaunchArgs,

        /// Arguments passed to sqld
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Start sqld in the foreground; Ctrl-C stops it gracefully
    Serve {
        /// Seconds to wait after SIGTERM before killing
        #[arg(long = "grace-secs", value_name = "SECS", default_value_t = 5)]
        grace_secs: u64,

        #[command(flatten)]
        launch: LaunchArgs,

        /// Arguments passed to sqld
        #[arg(last = true)]
        args: Vec<String>,
    },
}

/// Process setup shared by `run` and `serve`.
#[derive(Args, Debug, Default, Clone)]
pub struct LaunchArgs {
    /// Working directory for sqld
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Extra environment variable for sqld (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,
}

/// Parse a `KEY=VALUE` pair. The value may itself contain `=`.
fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty variable name in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;

    #[test]
    fn env_pairs_split_on_first_equals() {
        assert_eq!(
            parse_env_pair("SQLD_DB_PATH=a=b").unwrap(),
            ("SQLD_DB_PATH".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_env_pair("EMPTY=").unwrap(),
            ("EMPTY".to_string(), String::new())
        );
        assert!(parse_env_pair("NOEQUALS").is_err());
        assert!(parse_env_pair("=value").is_err());
    }

    #[test]
    fn run_collects_options_and_trailing_args() {
        let cli = Cli::parse_from([
            "sqld-launcher",
            "run",
            "--timeout-ms",
            "250",
            "--cwd",
            "/srv",
            "--env",
            "A=1",
            "--env",
            "B=2",
            "--",
            "--http-listen-addr",
            "127.0.0.1:8080",
        ]);

        let Some(Commands::Run {
            timeout_ms,
            launch,
            args,
        }) = cli.command
        else {
            panic!("expected run command");
        };
        assert_eq!(timeout_ms, Some(250));
        assert_eq!(launch.cwd, Some(PathBuf::from("/srv")));
        assert_eq!(launch.env.len(), 2);
        assert_eq!(args, ["--http-listen-addr", "127.0.0.1:8080"]);
    }

    #[test]
    fn serve_defaults_grace_period() {
        let cli = Cli::parse_from(["sqld-launcher", "serve"]);
        let Some(Commands::Serve {
            grace_secs, args, ..
        }) = cli.command
        else {
            panic!("expected serve command");
        };
        assert_eq!(grace_secs, 5);
        assert!(args.is_empty());
    }

    #[test]
    fn malformed_env_is_rejected() {
        let result = Cli::try_parse_from(["sqld-launcher", "run", "--env", "oops"]);
        assert!(result.is_err());
    }
}
