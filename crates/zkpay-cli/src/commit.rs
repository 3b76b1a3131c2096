//! # Commit Subcommand
//!
//! Prints the commitment of a rule file. Reordering destinations or
//! reformatting the file leaves the output unchanged.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::json;
use zkpay_rules::RuleEncoder;

use crate::{load_rules, print_json};

/// Arguments for `zkpay commit`.
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Rule file (YAML, or JSON with a `.json` extension).
    pub rules: PathBuf,

    /// Also print the canonical bytes the commitment is computed over.
    #[arg(long)]
    pub show_canonical: bool,
}

pub fn run_commit(args: &CommitArgs) -> Result<u8> {
    let rules = load_rules(&args.rules)?;
    let commitment = RuleEncoder::commit(&rules)?;
    if args.show_canonical {
        let canonical = RuleEncoder::canonical_form(&rules)?;
        print_json(&json!({
            "rule_commitment": commitment.to_string(),
            "canonical": String::from_utf8_lossy(canonical.as_bytes()),
        }))?;
    } else {
        print_json(&json!({ "rule_commitment": commitment.to_string() }))?;
    }
    Ok(0)
}
