//! # zkpay-cli — Command-Line Interface for zkpay
//!
//! Provides the `zkpay` binary.
//!
//! ## Subcommands
//!
//! - `zkpay setup` — Generate the Groth16 key pair and manifest.
//! - `zkpay commit` — Print the commitment of a rule file.
//! - `zkpay prove` — Generate a proof artifact for one payment.
//! - `zkpay verify` — Verify a proof artifact against a rule file.
//! - `zkpay authorize` — Run the full authorization pipeline.
//!
//! ```bash
//! zkpay setup --dir ./keys
//! zkpay commit rules.yaml
//! zkpay --config zkpay.yaml prove rules.yaml --destination 0xD1 --amount 6 > proof.json
//! zkpay --config zkpay.yaml verify proof.json rules.yaml --destination 0xD1 --amount 6
//! zkpay --config zkpay.yaml authorize rules.yaml --user alice --destination 0xD1 --amount 6
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr.

pub mod authorize;
pub mod commit;
pub mod prove;
pub mod setup;
pub mod verify;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use zkpay_core::Timestamp;
use zkpay_pipeline::PipelineConfig;
use zkpay_rules::RuleSet;
use zkpay_zkp::{
    ArtifactStore, FixedClock, JsonRpcOracle, KeyedOracle, Prover, VerificationOracle,
};

/// Exit code for a payment that was evaluated but not authorized.
pub const EXIT_NOT_AUTHORIZED: u8 = 2;

/// Load the pipeline configuration: the file if given, else defaults,
/// then `ZKPAY_*` environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

/// Read a rule set from a `.json` file, or YAML otherwise.
pub fn load_rules(path: &Path) -> Result<RuleSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules: {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rules = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("invalid rules in {}", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid rules in {}", path.display()))?
    };
    Ok(rules)
}

/// Prover over the configured artifacts directory, optionally pinned to
/// an RFC 3339 instant instead of the system clock.
pub fn prover_for(config: &PipelineConfig, at: Option<&str>) -> Result<Prover> {
    let prover = match &config.artifacts_dir {
        Some(dir) => Prover::new(ArtifactStore::new(dir)),
        None => Prover::without_artifacts(),
    };
    Ok(match at {
        Some(at) => {
            let at = Timestamp::parse(at).with_context(|| format!("invalid --at time {at:?}"))?;
            prover.with_clock(Arc::new(FixedClock::new(at)))
        }
        None => prover,
    })
}

/// The on-chain verification path to use, if any.
///
/// `keyed` selects an in-process oracle over the configured verifying key
/// with `rules` registered; otherwise the configured JSON-RPC oracle.
pub fn oracle_for(
    config: &PipelineConfig,
    keyed: bool,
    rules: &RuleSet,
) -> Result<Option<Arc<dyn VerificationOracle>>> {
    if keyed {
        let dir = config
            .artifacts_dir
            .as_ref()
            .context("--keyed needs an artifacts directory")?;
        let oracle = KeyedOracle::from_store(&ArtifactStore::new(dir))
            .with_context(|| format!("cannot load verifying key from {}", dir.display()))?;
        oracle.register(rules)?;
        return Ok(Some(Arc::new(oracle)));
    }
    match &config.oracle {
        Some(oracle) => Ok(Some(Arc::new(JsonRpcOracle::new(oracle.clone())?))),
        None => Ok(None),
    }
}

pub(crate) fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{text}");
    Ok(())
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
