//! # Prove Subcommand
//!
//! Generates a proof artifact for one payment against a rule file and
//! writes it as JSON. Without usable keys the artifact falls back to
//! direct evaluation unless `--strict` is given.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use zkpay_rules::{PaymentIntent, RuleEncoder};

use crate::{load_config, load_rules, print_json, prover_for};

/// Arguments for `zkpay prove`.
#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Rule file (YAML, or JSON with a `.json` extension).
    pub rules: PathBuf,

    /// Payment destination identifier.
    #[arg(long)]
    pub destination: String,

    /// Payment amount in the smallest currency unit.
    #[arg(long)]
    pub amount: u64,

    /// Evaluate as of this RFC 3339 UTC instant instead of now.
    #[arg(long)]
    pub at: Option<String>,

    /// Fail instead of falling back to direct evaluation.
    #[arg(long)]
    pub strict: bool,

    /// Write the artifact here instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

pub fn run_prove(args: &ProveArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = load_config(config_path)?;
    let rules = load_rules(&args.rules)?;
    let intent = PaymentIntent::new(&args.destination, args.amount)?;
    let commitment = RuleEncoder::commit(&rules)?;
    let prover = prover_for(&config, args.at.as_deref())?;

    let artifact = if args.strict {
        prover.prove_strict(&intent, &rules, &commitment)?
    } else {
        prover.prove(&intent, &rules, &commitment)?
    };
    tracing::info!(
        proof_id = %artifact.proof_id,
        trust_tier = %artifact.trust_tier(),
        overall = artifact.public_outputs.overall,
        "generated proof artifact"
    );

    match &args.out {
        Some(out) => {
            let bytes = serde_json::to_vec_pretty(&artifact)?;
            std::fs::write(out, bytes)
                .with_context(|| format!("failed to write artifact: {}", out.display()))?;
        }
        None => print_json(&artifact)?,
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkpay_zkp::{ProofArtifact, TrustTier};

    fn write_rules(dir: &Path) -> PathBuf {
        let path = dir.join("rules.yaml");
        std::fs::write(
            &path,
            "allowed_destinations: [\"0xD1\", \"0xD2\"]\n\
             max_amount: 10\n\
             allowed_hours: { start: 9, end: 18 }\n",
        )
        .unwrap();
        path
    }

    fn args(rules: PathBuf, out: PathBuf, strict: bool) -> ProveArgs {
        ProveArgs {
            rules,
            destination: "0xD3".into(),
            amount: 6,
            at: Some("2026-01-15T14:00:00Z".into()),
            strict,
            out: Some(out),
        }
    }

    #[test]
    fn prove_without_keys_writes_direct_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("proof.json");
        let config = dir.path().join("zkpay.yaml");
        std::fs::write(&config, "{}").unwrap();

        let code = run_prove(&args(write_rules(dir.path()), out.clone(), false), Some(&config))
            .unwrap();
        assert_eq!(code, 0);

        let artifact: ProofArtifact =
            serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(artifact.trust_tier(), TrustTier::DirectEvaluation);
        // A failing payment still yields an artifact; the bits say why.
        assert!(!artifact.public_outputs.destination);
        assert!(!artifact.public_outputs.overall);
    }

    #[test]
    fn strict_prove_without_keys_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("proof.json");
        let config = dir.path().join("zkpay.yaml");
        std::fs::write(&config, "{}").unwrap();

        assert!(run_prove(&args(write_rules(dir.path()), out.clone(), true), Some(&config)).is_err());
        assert!(!out.exists());
    }
}
