// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]

//! songlake CLI
//!
//! Runs the song play ETL between an input and an output root

use clap::Parser;
use songlake::cli::{Cli, Runner};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let runner = Runner::new(cli);

    match runner.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, stage = ?e.stage(), "Run failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
