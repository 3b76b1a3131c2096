//! # Proof Artifacts
//!
//! What the prover hands to the verifier: the committed rules it was built
//! against, the four public output bits, and either a Groth16 proof or an
//! explicit marker that the checks were evaluated in the clear.
//!
//! ## Security Invariant
//!
//! An artifact read from the wire is untrusted. The output bits are not
//! checked for consistency on decode; the verifier does that, so a forged
//! artifact is rejected at verification rather than silently repaired.

use serde::{Deserialize, Serialize};
use zkpay_circuit::{fr_from_hex, CircuitError, Fr, PublicOutputs};
use zkpay_core::{ProofId, Timestamp};
use zkpay_rules::RuleCommitment;

use crate::groth16::Groth16Proof;
use crate::traits::VerifyError;

/// How much a verifier can rely on an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    /// Backed by a Groth16 proof.
    Proved,
    /// Proving keys were unavailable; the checks ran in the clear.
    DirectEvaluation,
}

impl TrustTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proved => "proved",
            Self::DirectEvaluation => "direct_evaluation",
        }
    }
}

impl std::fmt::Display for TrustTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProofPayload {
    Groth16 {
        curve: String,
        proof_hex: String,
        /// Big-endian hex field elements, in circuit allocation order.
        public_inputs: Vec<String>,
    },
    Unproven {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofArtifact {
    pub proof_id: ProofId,
    pub rule_commitment: RuleCommitment,
    pub proof: ProofPayload,
    pub public_outputs: PublicOutputs,
    pub generated_at: Timestamp,
}

impl ProofArtifact {
    pub fn trust_tier(&self) -> TrustTier {
        match self.proof {
            ProofPayload::Groth16 { .. } => TrustTier::Proved,
            ProofPayload::Unproven { .. } => TrustTier::DirectEvaluation,
        }
    }

    pub fn is_proved(&self) -> bool {
        self.trust_tier() == TrustTier::Proved
    }

    /// Decode the Groth16 proof, if there is one.
    pub fn groth16_proof(&self) -> Option<Result<Groth16Proof, VerifyError>> {
        match &self.proof {
            ProofPayload::Groth16 { proof_hex, .. } => Some(Groth16Proof::from_hex(proof_hex)),
            ProofPayload::Unproven { .. } => None,
        }
    }

    /// Decode the public input vector, if there is one.
    pub fn public_input_values(&self) -> Option<Result<Vec<Fr>, CircuitError>> {
        match &self.proof {
            ProofPayload::Groth16 { public_inputs, .. } => Some(
                public_inputs
                    .iter()
                    .map(|s| fr_from_hex(s))
                    .collect::<Result<Vec<_>, _>>(),
            ),
            ProofPayload::Unproven { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkpay_rules::{RuleEncoder, RuleSet};

    fn artifact(proof: ProofPayload) -> ProofArtifact {
        let rules = RuleSet::new(["0xD1"], 10, 9, 18).unwrap();
        ProofArtifact {
            proof_id: ProofId::new(),
            rule_commitment: RuleEncoder::commit(&rules).unwrap(),
            proof,
            public_outputs: PublicOutputs::from_checks(true, true, true),
            generated_at: Timestamp::from_epoch_secs(1_768_485_600).unwrap(),
        }
    }

    #[test]
    fn unproven_artifact_json_shape() {
        let a = artifact(ProofPayload::Unproven {
            reason: "keys missing".into(),
        });
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["proof"]["kind"], "unproven");
        assert_eq!(json["public_outputs"], serde_json::json!([1, 1, 1, 1]));
        assert_eq!(a.trust_tier(), TrustTier::DirectEvaluation);
        assert!(a.groth16_proof().is_none());

        let back: ProofArtifact = serde_json::from_value(json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn forged_output_bits_survive_decode() {
        let mut json = serde_json::to_value(artifact(ProofPayload::Unproven {
            reason: String::new(),
        }))
        .unwrap();
        json["public_outputs"] = serde_json::json!([1, 0, 1, 1]);
        let back: ProofArtifact = serde_json::from_value(json).unwrap();
        assert!(!back.public_outputs.is_consistent());
    }

    #[test]
    fn bad_public_input_hex_is_reported() {
        let a = artifact(ProofPayload::Groth16 {
            curve: "bn254".into(),
            proof_hex: String::new(),
            public_inputs: vec!["xyz".into()],
        });
        assert!(a.is_proved());
        assert!(a.public_input_values().unwrap().is_err());
        assert!(a.groth16_proof().unwrap().is_err());
    }
}
