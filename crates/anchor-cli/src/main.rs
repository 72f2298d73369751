//! Anchor CLI
//!
//! Entry point for the `anchor` binary.

#![allow(clippy::print_stderr)]

use anchor_cli::{failure_message, init_logging, Cli};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose, cli.global.log_format);

    match anchor_cli::commands::execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", failure_message(&error));
            ExitCode::FAILURE
        }
    }
}
