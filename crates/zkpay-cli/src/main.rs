//! # zkpay CLI entry point
//!
//! Parses command-line arguments, initializes logging, and dispatches to
//! the subcommand handlers in `zkpay_cli`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkpay_cli::authorize::{run_authorize, AuthorizeArgs};
use zkpay_cli::commit::{run_commit, CommitArgs};
use zkpay_cli::prove::{run_prove, ProveArgs};
use zkpay_cli::setup::{run_setup, SetupArgs};
use zkpay_cli::verify::{run_verify, VerifyArgs};

/// zkpay: proof-gated payment authorization.
///
/// Commits payment rules, proves that a payment satisfies them without
/// revealing its destination or amount, and verifies the proof before any
/// payment is released.
#[derive(Parser, Debug)]
#[command(name = "zkpay", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the pipeline configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the proving and verifying keys for the rule circuit.
    Setup(SetupArgs),

    /// Print the commitment of a rule file.
    Commit(CommitArgs),

    /// Generate a proof artifact for one payment.
    Prove(ProveArgs),

    /// Verify a proof artifact against a rule file.
    Verify(VerifyArgs),

    /// Run the full authorization pipeline for one payment.
    Authorize(AuthorizeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "zkpay CLI starting");

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Setup(args) => run_setup(args, config),
        Commands::Commit(args) => run_commit(args),
        Commands::Prove(args) => run_prove(args, config),
        Commands::Verify(args) => run_verify(args, config),
        Commands::Authorize(args) => run_authorize(args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
