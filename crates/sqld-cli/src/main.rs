//! CLI entry point.
//!
//! Wires logging and `.env` loading, parses arguments and dispatches to the
//! handlers. Exit codes come from [`CliError`]; any other failure exits 1.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use sqld_cli::{Cli, CliError, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before reading any configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Err(err) = handlers::dispatch(command).await {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            eprintln!("Error: {err:#}");
            std::process::exit(cli_err.exit_code());
        }
        return Err(err);
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for paths and JSON.
///
/// `RUST_LOG` wins; otherwise `-v` selects debug and the default is warn.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
