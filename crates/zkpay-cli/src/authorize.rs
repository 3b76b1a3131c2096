//! # Authorize Subcommand
//!
//! Runs the full pipeline for one payment: commit the rules, prove,
//! verify, and hand the authorized payment to a dry-run executor. Prints
//! the outcome and, with `--events`, every stage event of the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde_json::json;
use zkpay_core::UserId;
use zkpay_pipeline::{
    verifier_for, AuthorizationContext, AuthorizationPipeline, DryRunExecutor, FanoutObserver,
    InMemoryRuleLedger, MemoryObserver, TracingObserver,
};
use zkpay_rules::PaymentIntent;

use crate::{
    load_config, load_rules, oracle_for, print_json, prover_for, runtime, EXIT_NOT_AUTHORIZED,
};

/// Arguments for `zkpay authorize`.
#[derive(Args, Debug)]
pub struct AuthorizeArgs {
    /// Rule file (YAML, or JSON with a `.json` extension).
    pub rules: PathBuf,

    /// Handle of the user the rules belong to.
    #[arg(long)]
    pub user: String,

    /// Payment destination identifier.
    #[arg(long)]
    pub destination: String,

    /// Payment amount in the smallest currency unit.
    #[arg(long)]
    pub amount: u64,

    /// Evaluate as of this RFC 3339 UTC instant instead of now.
    #[arg(long)]
    pub at: Option<String>,

    /// Verify against the local verifying key as the on-chain path.
    #[arg(long)]
    pub keyed: bool,

    /// Let local fallback accept direct-evaluation artifacts.
    #[arg(long)]
    pub accept_unproven: bool,

    /// Include the stage events of the run in the output.
    #[arg(long)]
    pub events: bool,
}

pub fn run_authorize(args: &AuthorizeArgs, config_path: Option<&Path>) -> Result<u8> {
    let mut config = load_config(config_path)?;
    config.accept_unproven |= args.accept_unproven;

    let rules = load_rules(&args.rules)?;
    let user = UserId::new(&args.user)?;
    let intent = PaymentIntent::new(&args.destination, args.amount)?;

    let prover = prover_for(&config, args.at.as_deref())?;
    let verifier = verifier_for(&config, oracle_for(&config, args.keyed, &rules)?);
    let memory = Arc::new(MemoryObserver::new());
    let observer = FanoutObserver::new()
        .with(Arc::new(TracingObserver))
        .with(memory.clone());
    let ctx = AuthorizationContext::new(prover, verifier)
        .with_ledger(Arc::new(InMemoryRuleLedger::new()))
        .with_executor(Arc::new(DryRunExecutor))
        .with_observer(Arc::new(observer));
    let pipeline = AuthorizationPipeline::new(ctx);

    let outcome = runtime()?.block_on(pipeline.run(&user, &rules, &intent))?;

    if args.events {
        print_json(&json!({ "outcome": outcome, "events": memory.events() }))?;
    } else {
        print_json(&outcome)?;
    }
    Ok(if outcome.is_authorized() {
        0
    } else {
        EXIT_NOT_AUTHORIZED
    })
}
