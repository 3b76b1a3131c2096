//! # Verification Oracles
//!
//! The authority that decides whether a Groth16 proof is valid for a
//! committed rule set. In production this is a verifier contract reached
//! over JSON-RPC ([`JsonRpcOracle`]); development deployments and tests use
//! the in-process [`KeyedOracle`].
//!
//! Any oracle failure is recoverable: the verifier downgrades to local
//! structural checks and records why.

pub mod jsonrpc;
pub mod keyed;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkpay_circuit::PublicOutputs;
use zkpay_core::ProofId;
use zkpay_rules::RuleCommitment;

pub use jsonrpc::{JsonRpcOracle, OracleConfig, DEFAULT_ORACLE_METHOD, DEFAULT_ORACLE_TIMEOUT_MS};
pub use keyed::KeyedOracle;

use crate::proof::{ProofArtifact, ProofPayload};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle unreachable: {0}")]
    Unreachable(String),

    #[error("oracle rejected the submission: {0}")]
    Reverted(String),

    #[error("oracle returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("oracle did not answer within {0:?}")]
    Timeout(Duration),

    #[error("artifact cannot be submitted: {0}")]
    InvalidSubmission(String),
}

/// What is sent to the oracle for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSubmission {
    pub proof_id: ProofId,
    pub proof_hex: String,
    pub public_inputs: Vec<String>,
    pub public_outputs: PublicOutputs,
    pub rule_commitment: RuleCommitment,
    pub destination: String,
    pub amount: u64,
}

impl OracleSubmission {
    /// Build a submission from a proved artifact and the declared payment.
    pub fn from_artifact(
        artifact: &ProofArtifact,
        destination: &str,
        amount: u64,
    ) -> Result<Self, OracleError> {
        match &artifact.proof {
            ProofPayload::Groth16 {
                proof_hex,
                public_inputs,
                ..
            } => Ok(Self {
                proof_id: artifact.proof_id,
                proof_hex: proof_hex.clone(),
                public_inputs: public_inputs.clone(),
                public_outputs: artifact.public_outputs,
                rule_commitment: artifact.rule_commitment.clone(),
                destination: destination.to_string(),
                amount,
            }),
            ProofPayload::Unproven { .. } => Err(OracleError::InvalidSubmission(
                "artifact carries no proof".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleVerdict {
    pub verified: bool,
    #[serde(default)]
    pub receipt: Option<String>,
}

#[async_trait]
pub trait VerificationOracle: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn submit(&self, submission: &OracleSubmission) -> Result<OracleVerdict, OracleError>;
}
