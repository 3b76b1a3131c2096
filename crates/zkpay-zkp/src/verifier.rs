//! # Verifier
//!
//! Decides whether a proof artifact authorizes a payment.
//!
//! Two strategies share [`VerificationStrategy`] and carry their own
//! [`VerificationMode`]:
//!
//! - [`OnChainVerifier`] submits the proof to a [`VerificationOracle`]
//!   under an explicit timeout.
//! - [`LocalStructuralVerifier`] checks the artifact shape only: a
//!   decodable 128-byte proof and a public input vector that agrees with
//!   the output bits. It does not run the pairing check.
//!
//! [`Verifier`] tries the oracle first for proved artifacts and drops to
//! local checks on any oracle failure, recording the reason. Artifacts
//! without a proof never reach the oracle.
//!
//! ## Security Invariant
//!
//! `authorized` is true only if the strategy accepted the artifact, all
//! four output bits are 1 and mutually consistent, and the artifact was
//! built against the expected rule commitment. This holds in both modes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zkpay_circuit::{fr_from_hex, Fr, NUM_PUBLIC_INPUTS};
use zkpay_rules::{Destination, RuleCommitment};

use crate::groth16::{Groth16Proof, CURVE};
use crate::oracle::{
    OracleError, OracleSubmission, VerificationOracle, DEFAULT_ORACLE_TIMEOUT_MS,
};
use crate::proof::{ProofArtifact, ProofPayload, TrustTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    OnChain,
    LocalFallback,
}

impl VerificationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnChain => "on_chain",
            Self::LocalFallback => "local_fallback",
        }
    }
}

impl std::fmt::Display for VerificationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub authorized: bool,
    pub mode: VerificationMode,
    pub trust_tier: TrustTier,
    pub receipt: Option<String>,
    /// Why the on-chain path was not used, when it was not.
    pub fallback_reason: Option<String>,
}

/// A single strategy's answer, before the authorization invariant is
/// applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyVerdict {
    pub verified: bool,
    pub receipt: Option<String>,
}

#[async_trait]
pub trait VerificationStrategy: Send + Sync {
    fn mode(&self) -> VerificationMode;

    async fn check(
        &self,
        artifact: &ProofArtifact,
        expected: &RuleCommitment,
        destination: &Destination,
        amount: u64,
    ) -> Result<StrategyVerdict, OracleError>;
}

pub struct OnChainVerifier {
    oracle: Arc<dyn VerificationOracle>,
    timeout: Duration,
}

impl OnChainVerifier {
    pub fn new(oracle: Arc<dyn VerificationOracle>) -> Self {
        Self {
            oracle,
            timeout: Duration::from_millis(DEFAULT_ORACLE_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }
}

impl std::fmt::Debug for OnChainVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnChainVerifier")
            .field("oracle", &self.oracle.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl VerificationStrategy for OnChainVerifier {
    fn mode(&self) -> VerificationMode {
        VerificationMode::OnChain
    }

    async fn check(
        &self,
        artifact: &ProofArtifact,
        expected: &RuleCommitment,
        destination: &Destination,
        amount: u64,
    ) -> Result<StrategyVerdict, OracleError> {
        // The oracle only ever judges proofs against the caller's rules.
        if artifact.rule_commitment != *expected {
            tracing::debug!(
                proof_id = %artifact.proof_id,
                "artifact built against other rules, not submitted"
            );
            return Ok(StrategyVerdict {
                verified: false,
                receipt: None,
            });
        }
        let submission = OracleSubmission::from_artifact(artifact, destination.as_str(), amount)?;
        let verdict = tokio::time::timeout(self.timeout, self.oracle.submit(&submission))
            .await
            .map_err(|_| OracleError::Timeout(self.timeout))??;
        Ok(StrategyVerdict {
            verified: verdict.verified,
            receipt: verdict.receipt,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStructuralVerifier {
    /// Accept direct-evaluation artifacts. Off by default: without a proof
    /// there is nothing but the prover's word.
    pub accept_unproven: bool,
}

impl LocalStructuralVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepting_unproven() -> Self {
        Self {
            accept_unproven: true,
        }
    }

    fn structural_problem(&self, artifact: &ProofArtifact) -> Option<String> {
        let (curve, proof_hex, public_inputs) = match &artifact.proof {
            ProofPayload::Groth16 {
                curve,
                proof_hex,
                public_inputs,
            } => (curve, proof_hex, public_inputs),
            ProofPayload::Unproven { .. } => {
                return (!self.accept_unproven)
                    .then(|| "direct-evaluation artifacts are not accepted".to_string());
            }
        };
        if curve != CURVE {
            return Some(format!("unsupported curve {curve}"));
        }
        if let Err(e) = Groth16Proof::from_hex(proof_hex) {
            return Some(e.to_string());
        }
        if public_inputs.len() != NUM_PUBLIC_INPUTS {
            return Some(format!(
                "expected {NUM_PUBLIC_INPUTS} public inputs, got {}",
                public_inputs.len()
            ));
        }
        let values = match public_inputs
            .iter()
            .map(|s| fr_from_hex(s))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(v) => v,
            Err(e) => return Some(e.to_string()),
        };
        let bits = artifact.public_outputs.bits().map(|b| Fr::from(u64::from(b)));
        if values[..bits.len()] != bits[..] {
            return Some("public inputs disagree with the output bits".into());
        }
        None
    }
}

#[async_trait]
impl VerificationStrategy for LocalStructuralVerifier {
    fn mode(&self) -> VerificationMode {
        VerificationMode::LocalFallback
    }

    async fn check(
        &self,
        artifact: &ProofArtifact,
        _expected: &RuleCommitment,
        _destination: &Destination,
        _amount: u64,
    ) -> Result<StrategyVerdict, OracleError> {
        let problem = self.structural_problem(artifact);
        if let Some(reason) = &problem {
            tracing::debug!(proof_id = %artifact.proof_id, %reason, "structural check failed");
        }
        Ok(StrategyVerdict {
            verified: problem.is_none(),
            receipt: None,
        })
    }
}

/// On-chain verification with a local fallback.
#[derive(Debug)]
pub struct Verifier {
    on_chain: Option<OnChainVerifier>,
    local: LocalStructuralVerifier,
}

impl Verifier {
    pub fn new(on_chain: Option<OnChainVerifier>, local: LocalStructuralVerifier) -> Self {
        Self { on_chain, local }
    }

    pub fn local_only(local: LocalStructuralVerifier) -> Self {
        Self::new(None, local)
    }

    pub fn has_oracle(&self) -> bool {
        self.on_chain.is_some()
    }

    pub async fn verify(
        &self,
        artifact: &ProofArtifact,
        expected: &RuleCommitment,
        destination: &Destination,
        amount: u64,
    ) -> VerificationResult {
        let fallback_reason = match (&self.on_chain, artifact.is_proved()) {
            (_, false) => "artifact carries no proof".to_string(),
            (None, true) => "no verification oracle configured".to_string(),
            (Some(on_chain), true) => {
                match on_chain.check(artifact, expected, destination, amount).await {
                    Ok(verdict) => return finish(artifact, expected, on_chain.mode(), verdict, None),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            oracle = on_chain.oracle_name(),
                            proof_id = %artifact.proof_id,
                            "oracle verification failed, falling back to local checks"
                        );
                        e.to_string()
                    }
                }
            }
        };

        let verdict = self
            .local
            .check(artifact, expected, destination, amount)
            .await
            .unwrap_or(StrategyVerdict {
                verified: false,
                receipt: None,
            });
        finish(artifact, expected, self.local.mode(), verdict, Some(fallback_reason))
    }
}

fn finish(
    artifact: &ProofArtifact,
    expected: &RuleCommitment,
    mode: VerificationMode,
    verdict: StrategyVerdict,
    fallback_reason: Option<String>,
) -> VerificationResult {
    let outputs = &artifact.public_outputs;
    let authorized = verdict.verified
        && outputs.is_consistent()
        && outputs.all_pass()
        && artifact.rule_commitment == *expected;

    metrics::counter!("zkpay_verifications_total", "mode" => mode.as_str()).increment(1);
    tracing::info!(
        proof_id = %artifact.proof_id,
        mode = %mode,
        authorized,
        "verification complete"
    );

    VerificationResult {
        authorized,
        mode,
        trust_tier: artifact.trust_tier(),
        receipt: verdict.receipt,
        fallback_reason,
    }
}
