//! # Prover
//!
//! Turns a payment intent and a committed rule set into a [`ProofArtifact`].
//!
//! 1. Re-validate the intent and the rule commitment.
//! 2. Sample the clock; the circuit derives the hour from it.
//! 3. Build the assigned circuit and check it is satisfiable.
//! 4. Load the proving key and run Groth16.
//!
//! When step 4 cannot get a key, [`Prover::prove()`] falls back to direct
//! evaluation: the same checks in the clear, packaged as
//! [`ProofPayload::Unproven`]. [`Prover::prove_strict()`] reports the
//! failure instead. Nothing is retried.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use zkpay_circuit::{fr_to_hex, CircuitInput, RuleValidationCircuit};
use zkpay_core::{ProofId, Timestamp};
use zkpay_rules::{
    IntentError, PaymentIntent, RuleCommitment, RuleEncoder, RuleEncodingError, RuleSet,
};

use crate::artifacts::{ArtifactError, ArtifactStore};
use crate::clock::{Clock, SystemClock};
use crate::groth16::{Groth16ProofSystem, RuleProvingKey, CURVE};
use crate::proof::{ProofArtifact, ProofPayload};
use crate::traits::ProofSystem;

#[derive(Error, Debug)]
pub enum ProverError {
    #[error("malformed payment intent: {0}")]
    MalformedIntent(#[from] IntentError),

    #[error(transparent)]
    RuleEncoding(#[from] RuleEncodingError),

    #[error("proving artifacts unavailable: {0}")]
    ArtifactsUnavailable(#[from] ArtifactError),

    #[error("proving engine error: {0}")]
    ProvingEngine(String),
}

/// Generates proof artifacts. Shareable across runs; holds no per-proof
/// state beyond the cached proving key.
#[derive(Debug)]
pub struct Prover {
    store: Option<ArtifactStore>,
    clock: Arc<dyn Clock>,
    system: Groth16ProofSystem,
    proving_key: RwLock<Option<Arc<RuleProvingKey>>>,
}

impl Prover {
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store: Some(store),
            clock: Arc::new(SystemClock),
            system: Groth16ProofSystem,
            proving_key: RwLock::new(None),
        }
    }

    /// A prover with no key material. Every artifact is direct evaluation.
    pub fn without_artifacts() -> Self {
        Self {
            store: None,
            clock: Arc::new(SystemClock),
            system: Groth16ProofSystem,
            proving_key: RwLock::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> Option<&ArtifactStore> {
        self.store.as_ref()
    }

    /// Prove, falling back to direct evaluation when keys are unavailable.
    pub fn prove(
        &self,
        intent: &PaymentIntent,
        rules: &RuleSet,
        commitment: &RuleCommitment,
    ) -> Result<ProofArtifact, ProverError> {
        let (circuit, at) = self.prepare(intent, rules, commitment)?;
        match self.proving_key() {
            Ok(pk) => self.groth16(&pk, circuit, commitment, at),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "proving key unavailable, evaluating rules in the clear"
                );
                direct_evaluation(&circuit, commitment, at, e.to_string())
            }
        }
    }

    /// Prove, or fail with `ArtifactsUnavailable`.
    pub fn prove_strict(
        &self,
        intent: &PaymentIntent,
        rules: &RuleSet,
        commitment: &RuleCommitment,
    ) -> Result<ProofArtifact, ProverError> {
        let (circuit, at) = self.prepare(intent, rules, commitment)?;
        let pk = self.proving_key()?;
        self.groth16(&pk, circuit, commitment, at)
    }

    fn prepare(
        &self,
        intent: &PaymentIntent,
        rules: &RuleSet,
        commitment: &RuleCommitment,
    ) -> Result<(RuleValidationCircuit, Timestamp), ProverError> {
        intent.validate()?;
        RuleEncoder::ensure_unchanged(rules, commitment)?;

        let at = self.clock.now();
        let circuit = RuleValidationCircuit::new(CircuitInput::new(
            intent,
            rules,
            at.unsigned_epoch_secs(),
        ));
        let satisfied = circuit
            .check_satisfied()
            .map_err(|e| ProverError::ProvingEngine(e.to_string()))?;
        if !satisfied {
            return Err(ProverError::ProvingEngine(
                "assignment does not satisfy the rule validation circuit".into(),
            ));
        }
        Ok((circuit, at))
    }

    fn proving_key(&self) -> Result<Arc<RuleProvingKey>, ArtifactError> {
        if let Some(pk) = self.proving_key.read().as_ref() {
            return Ok(Arc::clone(pk));
        }
        let store = self.store.as_ref().ok_or_else(|| ArtifactError::Missing {
            path: "<no artifact directory configured>".into(),
        })?;
        let mut slot = self.proving_key.write();
        if let Some(pk) = slot.as_ref() {
            return Ok(Arc::clone(pk));
        }
        let pk = Arc::new(store.load_proving_key()?);
        *slot = Some(Arc::clone(&pk));
        Ok(pk)
    }

    fn groth16(
        &self,
        pk: &RuleProvingKey,
        circuit: RuleValidationCircuit,
        commitment: &RuleCommitment,
        at: Timestamp,
    ) -> Result<ProofArtifact, ProverError> {
        let (outputs, inputs) = match (circuit.outputs(), circuit.public_inputs()) {
            (Some(o), Some(i)) => (o, i),
            _ => return Err(ProverError::ProvingEngine("circuit is not assigned".into())),
        };
        let proof = self
            .system
            .prove(pk, circuit)
            .map_err(|e| ProverError::ProvingEngine(e.to_string()))?;
        let proof_hex = proof
            .to_hex()
            .map_err(|e| ProverError::ProvingEngine(e.to_string()))?;

        let artifact = ProofArtifact {
            proof_id: ProofId::new(),
            rule_commitment: commitment.clone(),
            proof: ProofPayload::Groth16 {
                curve: CURVE.to_string(),
                proof_hex,
                public_inputs: inputs.iter().map(fr_to_hex).collect(),
            },
            public_outputs: outputs,
            generated_at: at,
        };
        record(&artifact);
        Ok(artifact)
    }
}

fn direct_evaluation(
    circuit: &RuleValidationCircuit,
    commitment: &RuleCommitment,
    at: Timestamp,
    reason: String,
) -> Result<ProofArtifact, ProverError> {
    let outputs = circuit
        .outputs()
        .ok_or_else(|| ProverError::ProvingEngine("circuit is not assigned".into()))?;
    let artifact = ProofArtifact {
        proof_id: ProofId::new(),
        rule_commitment: commitment.clone(),
        proof: ProofPayload::Unproven { reason },
        public_outputs: outputs,
        generated_at: at,
    };
    record(&artifact);
    Ok(artifact)
}

fn record(artifact: &ProofArtifact) {
    let tier = artifact.trust_tier();
    metrics::counter!("zkpay_proofs_total", "tier" => tier.as_str()).increment(1);
    tracing::debug!(
        proof_id = %artifact.proof_id,
        tier = %tier,
        overall = artifact.public_outputs.overall,
        "proof artifact generated"
    );
}
