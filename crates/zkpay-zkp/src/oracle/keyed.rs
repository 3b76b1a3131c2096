//! In-process oracle holding the verifying key and the committed rule sets.
//!
//! Behaves like the verifier contract: the public inputs are rebuilt from
//! the registered rules for the submitted commitment, never taken from the
//! submission, so a proof made against other rule parameters fails.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use zkpay_circuit::{fr_to_hex, RuleParameters};
use zkpay_rules::{RuleCommitment, RuleEncoder, RuleEncodingError, RuleSet};

use super::{OracleError, OracleSubmission, OracleVerdict, VerificationOracle};
use crate::artifacts::{ArtifactError, ArtifactStore};
use crate::groth16::{Groth16Proof, Groth16ProofSystem, RuleVerifyingKey};
use crate::traits::ProofSystem;

#[derive(Debug)]
pub struct KeyedOracle {
    vk: RuleVerifyingKey,
    registry: RwLock<HashMap<RuleCommitment, RuleParameters>>,
}

impl KeyedOracle {
    pub fn new(vk: RuleVerifyingKey) -> Self {
        Self {
            vk,
            registry: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_store(store: &ArtifactStore) -> Result<Self, ArtifactError> {
        Ok(Self::new(store.load_verifying_key()?))
    }

    /// Register a rule set so proofs against its commitment can verify.
    pub fn register(&self, rules: &RuleSet) -> Result<RuleCommitment, RuleEncodingError> {
        let commitment = RuleEncoder::commit(rules)?;
        self.registry
            .write()
            .insert(commitment.clone(), RuleParameters::from_rules(rules));
        Ok(commitment)
    }

    pub fn is_registered(&self, commitment: &RuleCommitment) -> bool {
        self.registry.read().contains_key(commitment)
    }
}

#[async_trait]
impl VerificationOracle for KeyedOracle {
    fn name(&self) -> &str {
        "keyed"
    }

    async fn submit(&self, submission: &OracleSubmission) -> Result<OracleVerdict, OracleError> {
        let params = self
            .registry
            .read()
            .get(&submission.rule_commitment)
            .cloned()
            .ok_or_else(|| {
                OracleError::Reverted(format!(
                    "unknown rule commitment {}",
                    submission.rule_commitment
                ))
            })?;

        let expected = params.public_inputs(&submission.public_outputs);
        let declared_match = submission.public_inputs.len() == expected.len()
            && submission
                .public_inputs
                .iter()
                .zip(&expected)
                .all(|(s, e)| s.eq_ignore_ascii_case(&fr_to_hex(e)));

        let proof = Groth16Proof::from_hex(&submission.proof_hex)
            .map_err(|e| OracleError::Reverted(e.to_string()))?;
        let valid = Groth16ProofSystem
            .verify(&self.vk, &proof, &expected)
            .map_err(|e| OracleError::Reverted(e.to_string()))?;

        let verified = valid && declared_match;
        tracing::debug!(
            proof_id = %submission.proof_id,
            verified,
            "keyed oracle checked proof"
        );
        Ok(OracleVerdict {
            verified,
            receipt: verified.then(|| format!("keyed:{}", submission.proof_id.as_uuid())),
        })
    }
}
