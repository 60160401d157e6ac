//! # zonal CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zonal_cli::compile::{run_compile, CompileArgs};
use zonal_cli::inspect::{run_inspect, InspectArgs};
use zonal_cli::verify::{run_verify, VerifyArgs};

/// Zone transition history toolchain.
///
/// Inspects, verifies and compiles the compact binary form of time zone
/// offset histories.
#[derive(Parser, Debug)]
#[command(name = "zonal", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a blob and print a summary or JSON.
    Inspect(InspectArgs),

    /// Check that a blob re-encodes to identical bytes.
    Verify(VerifyArgs),

    /// Build a model from JSON and write its binary form.
    Compile(CompileArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("zonal CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Inspect(args) => run_inspect(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::Compile(args) => run_compile(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
