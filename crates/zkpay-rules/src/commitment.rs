//! # Rule Commitment
//!
//! `RuleEncoder::commit()` binds a `RuleSet` to a 32-byte digest. The
//! commitment is attached to every proof artifact and authorization record
//! produced for those rules, and is what the rule ledger stores per user.
//!
//! ## Security Invariant
//!
//! The digest input is the JCS form of
//! `{schema, allowed_destinations (sorted), max_amount, allowed_hours}`
//! produced by `CanonicalBytes`. The schema tag keeps commitments from a
//! future rule layout from colliding with this one. The encoder is pure:
//! no I/O, no clock, no randomness.

use serde::{Deserialize, Serialize};
use zkpay_core::{sha256_digest, CanonicalBytes, ContentDigest};

use crate::error::RuleEncodingError;
use crate::ruleset::{HourWindow, RuleSet};

/// Version tag mixed into every rule commitment.
pub const COMMITMENT_SCHEMA: &str = "zkpay.ruleset/v1";

/// Digest binding one specific rule set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleCommitment(ContentDigest);

impl RuleCommitment {
    pub fn digest(&self) -> &ContentDigest {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0.bytes
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    /// Parse a commitment previously rendered with `Display` or `to_hex`.
    pub fn from_hex(s: &str) -> Result<Self, zkpay_core::CoreError> {
        ContentDigest::from_hex(s).map(Self)
    }
}

impl std::fmt::Display for RuleCommitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Serialize)]
struct CommitmentPayload<'a> {
    schema: &'static str,
    allowed_destinations: Vec<&'a str>,
    max_amount: u64,
    allowed_hours: HourWindow,
}

/// Computes and re-checks rule commitments.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEncoder;

impl RuleEncoder {
    /// Commit to a rule set.
    pub fn commit(rules: &RuleSet) -> Result<RuleCommitment, RuleEncodingError> {
        let canonical = Self::canonical_form(rules)?;
        Ok(RuleCommitment(sha256_digest(&canonical)))
    }

    /// The exact bytes a commitment is taken over.
    pub fn canonical_form(rules: &RuleSet) -> Result<CanonicalBytes, RuleEncodingError> {
        let mut allowed_destinations: Vec<&str> = rules
            .allowed_destinations()
            .iter()
            .map(|d| d.as_str())
            .collect();
        allowed_destinations.sort_unstable();

        let payload = CommitmentPayload {
            schema: COMMITMENT_SCHEMA,
            allowed_destinations,
            max_amount: rules.max_amount(),
            allowed_hours: rules.allowed_hours(),
        };
        Ok(CanonicalBytes::new(&payload)?)
    }

    /// Recompute the commitment and compare in constant time.
    ///
    /// Returns `false` if the rules cannot be canonicalized.
    pub fn verify_unchanged(rules: &RuleSet, commitment: &RuleCommitment) -> bool {
        match Self::commit(rules) {
            Ok(recomputed) => recomputed == *commitment,
            Err(_) => false,
        }
    }

    /// Like [`RuleEncoder::verify_unchanged()`], but reports both digests
    /// on mismatch.
    pub fn ensure_unchanged(
        rules: &RuleSet,
        commitment: &RuleCommitment,
    ) -> Result<(), RuleEncodingError> {
        let recomputed = Self::commit(rules)?;
        if recomputed == *commitment {
            Ok(())
        } else {
            Err(RuleEncodingError::CommitmentMismatch {
                expected: commitment.to_string(),
                actual: recomputed.to_string(),
            })
        }
    }
}
