//! # Setup Subcommand
//!
//! Runs the Groth16 circuit-specific setup and writes the key pair and
//! manifest into the artifacts directory. The directory comes from
//! `--dir`, else from `artifacts_dir` in the configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::rngs::OsRng;
use zkpay_zkp::ArtifactStore;

use crate::{load_config, print_json};

/// Arguments for `zkpay setup`.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Directory to write `rule_validation.pk`, `.vk` and `manifest.json` to.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Replace keys that already exist. Proofs made with the old keys
    /// stop verifying.
    #[arg(long)]
    pub force: bool,
}

pub fn run_setup(args: &SetupArgs, config_path: Option<&Path>) -> Result<u8> {
    let dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => load_config(config_path)?
            .artifacts_dir
            .context("no artifacts directory: pass --dir or set artifacts_dir")?,
    };

    let store = ArtifactStore::new(&dir);
    if store.manifest_path().exists() && !args.force {
        bail!(
            "keys already exist in {} (use --force to replace them)",
            dir.display()
        );
    }

    let manifest = store
        .setup(&mut OsRng)
        .with_context(|| format!("key setup failed in {}", dir.display()))?;
    print_json(&manifest)?;
    Ok(0)
}
