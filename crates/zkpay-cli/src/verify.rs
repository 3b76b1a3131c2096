//! # Verify Subcommand
//!
//! Verifies a proof artifact against a rule file and the claimed payment.
//! Uses the configured oracle (or `--keyed`) and falls back to local
//! structural checks when it cannot. Exits 0 when authorized and
//! [`EXIT_NOT_AUTHORIZED`](crate::EXIT_NOT_AUTHORIZED) otherwise.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use zkpay_pipeline::verifier_for;
use zkpay_rules::{PaymentIntent, RuleEncoder};
use zkpay_zkp::ProofArtifact;

use crate::{load_config, load_rules, oracle_for, print_json, runtime, EXIT_NOT_AUTHORIZED};

/// Arguments for `zkpay verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Proof artifact written by `zkpay prove`.
    pub artifact: PathBuf,

    /// Rule file the artifact claims to satisfy.
    pub rules: PathBuf,

    /// Payment destination identifier.
    #[arg(long)]
    pub destination: String,

    /// Payment amount in the smallest currency unit.
    #[arg(long)]
    pub amount: u64,

    /// Verify against the local verifying key as the on-chain path.
    #[arg(long)]
    pub keyed: bool,

    /// Let local fallback accept direct-evaluation artifacts.
    #[arg(long)]
    pub accept_unproven: bool,
}

pub fn run_verify(args: &VerifyArgs, config_path: Option<&Path>) -> Result<u8> {
    let mut config = load_config(config_path)?;
    config.accept_unproven |= args.accept_unproven;

    let rules = load_rules(&args.rules)?;
    let intent = PaymentIntent::new(&args.destination, args.amount)?;
    let commitment = RuleEncoder::commit(&rules)?;
    let text = std::fs::read_to_string(&args.artifact)
        .with_context(|| format!("failed to read artifact: {}", args.artifact.display()))?;
    let artifact: ProofArtifact = serde_json::from_str(&text)
        .with_context(|| format!("invalid artifact: {}", args.artifact.display()))?;

    let verifier = verifier_for(&config, oracle_for(&config, args.keyed, &rules)?);
    let result = runtime()?.block_on(verifier.verify(
        &artifact,
        &commitment,
        intent.destination(),
        intent.amount(),
    ));

    print_json(&result)?;
    Ok(if result.authorized { 0 } else { EXIT_NOT_AUTHORIZED })
}
