//! `sqld-launcher`: inspect and run the platform-specific sqld binary.
//!
//! The library half holds argument parsing, error mapping and the command
//! handlers; `main.rs` only wires logging and configuration together and
//! dispatches.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings for crates only used by integration tests
#[cfg(test)]
use tempfile as _;

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use commands::{Commands, LaunchArgs};
pub use error::CliError;
pub use parser::Cli;
