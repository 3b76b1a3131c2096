//! # Authorization Pipeline
//!
//! Drives one run from rule commitment to the execution gate:
//!
//! 1. **CommitRules**: commit the rule set and record it in the ledger.
//! 2. **DeriveIntent**: re-check the intent shape.
//! 3. **GenerateProof**: prove on a blocking thread. A failing output bit
//!    ends the run with [`AuthorizationOutcome::RejectedByRules`]; the
//!    verifier and executor are never called.
//! 4. **Verify**: confirm the rules and the ledger entry are unchanged,
//!    then verify. Not authorized ends the run with
//!    [`AuthorizationOutcome::VerificationFailed`].
//! 5. **AuthorizedForExecution**, then **Execute** if an executor is
//!    configured.
//!
//! Every transition is reported to the observer. Stages of one run are
//! strictly sequential; nothing is retried. Runs share no mutable state
//! beyond the ledger.

use serde_json::json;
use tracing::Instrument;
use zkpay_core::{ProcessId, UserId};
use zkpay_rules::{PaymentIntent, RuleCommitment, RuleEncoder, RuleEncodingError, RuleSet};
use zkpay_zkp::{ProofArtifact, ProverError};

use crate::context::AuthorizationContext;
use crate::error::{PipelineError, PipelineErrorKind};
use crate::executor::{AuthorizedPayment, ExecutionReceipt};
use crate::record::{AuthorizationOutcome, AuthorizationRecord, RuleViolation};
use crate::stage::{Stage, StageEvent, StageStatus};

#[derive(Debug, Clone)]
pub struct AuthorizationPipeline {
    ctx: AuthorizationContext,
}

impl AuthorizationPipeline {
    pub fn new(ctx: AuthorizationContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &AuthorizationContext {
        &self.ctx
    }

    /// Run the pipeline under a fresh process id.
    pub async fn run(
        &self,
        user: &UserId,
        rules: &RuleSet,
        intent: &PaymentIntent,
    ) -> Result<AuthorizationOutcome, PipelineError> {
        self.run_as(ProcessId::new(), user, rules, intent).await
    }

    /// Run under a caller-chosen process id. Reusing an id is the caller's
    /// problem; a failed id is never resumed.
    pub async fn run_as(
        &self,
        process_id: ProcessId,
        user: &UserId,
        rules: &RuleSet,
        intent: &PaymentIntent,
    ) -> Result<AuthorizationOutcome, PipelineError> {
        let span = tracing::info_span!("authorization", process_id = %process_id, user = %user);
        let result = Run {
            ctx: &self.ctx,
            process_id,
        }
        .drive(user, rules, intent)
        .instrument(span)
        .await;

        let label = match &result {
            Ok(outcome) => outcome.as_str(),
            Err(_) => "error",
        };
        metrics::counter!("zkpay_pipeline_runs_total", "outcome" => label).increment(1);
        result
    }
}

/// State for one run.
struct Run<'a> {
    ctx: &'a AuthorizationContext,
    process_id: ProcessId,
}

impl Run<'_> {
    async fn drive(
        &self,
        user: &UserId,
        rules: &RuleSet,
        intent: &PaymentIntent,
    ) -> Result<AuthorizationOutcome, PipelineError> {
        let commitment = self.commit_rules(user, rules).await?;
        self.derive_intent(intent)?;

        let artifact = self.generate_proof(rules, intent, &commitment).await?;
        if !artifact.public_outputs.overall {
            let violation =
                RuleViolation::new(self.process_id, commitment, artifact.public_outputs);
            self.emit(
                Stage::GenerateProof,
                StageStatus::Failed,
                json!({
                    "proof_id": artifact.proof_id,
                    "violations": violation.codes(),
                }),
            );
            return Ok(AuthorizationOutcome::RejectedByRules(violation));
        }
        self.emit(
            Stage::GenerateProof,
            StageStatus::Completed,
            json!({
                "proof_id": artifact.proof_id,
                "trust_tier": artifact.trust_tier(),
            }),
        );

        let record = self.verify(user, rules, intent, commitment, artifact).await?;
        if !record.verified() {
            return Ok(AuthorizationOutcome::VerificationFailed(record));
        }

        self.emit(Stage::AuthorizedForExecution, StageStatus::Active, json!({}));
        self.emit(
            Stage::AuthorizedForExecution,
            StageStatus::Completed,
            json!({ "verification_mode": record.verification_mode() }),
        );
        let execution = self.execute(&record, intent).await?;
        Ok(AuthorizationOutcome::Authorized { record, execution })
    }

    async fn commit_rules(
        &self,
        user: &UserId,
        rules: &RuleSet,
    ) -> Result<RuleCommitment, PipelineError> {
        let stage = Stage::CommitRules;
        self.emit(stage, StageStatus::Active, json!({}));
        let commitment = RuleEncoder::commit(rules).map_err(|e| self.fail(stage, e))?;
        if let Some(ledger) = &self.ctx.ledger {
            ledger
                .record(user, &commitment)
                .await
                .map_err(|e| self.fail(stage, e))?;
        }
        self.emit(
            stage,
            StageStatus::Completed,
            json!({ "rule_commitment": commitment.to_hex() }),
        );
        Ok(commitment)
    }

    fn derive_intent(&self, intent: &PaymentIntent) -> Result<(), PipelineError> {
        let stage = Stage::DeriveIntent;
        self.emit(stage, StageStatus::Active, json!({}));
        intent
            .validate()
            .map_err(|e| self.fail(stage, ProverError::MalformedIntent(e)))?;
        self.emit(stage, StageStatus::Completed, json!({}));
        Ok(())
    }

    async fn generate_proof(
        &self,
        rules: &RuleSet,
        intent: &PaymentIntent,
        commitment: &RuleCommitment,
    ) -> Result<ProofArtifact, PipelineError> {
        let stage = Stage::GenerateProof;
        self.emit(stage, StageStatus::Active, json!({}));

        let prover = self.ctx.prover.clone();
        let (rules, intent, commitment) = (rules.clone(), intent.clone(), commitment.clone());
        tokio::task::spawn_blocking(move || prover.prove(&intent, &rules, &commitment))
            .await
            .map_err(|e| self.fail(stage, PipelineErrorKind::Task(e.to_string())))?
            .map_err(|e| self.fail(stage, e))
    }

    async fn verify(
        &self,
        user: &UserId,
        rules: &RuleSet,
        intent: &PaymentIntent,
        commitment: RuleCommitment,
        artifact: ProofArtifact,
    ) -> Result<AuthorizationRecord, PipelineError> {
        let stage = Stage::Verify;
        self.emit(stage, StageStatus::Active, json!({ "proof_id": artifact.proof_id }));

        RuleEncoder::ensure_unchanged(rules, &commitment).map_err(|e| self.fail(stage, e))?;
        if let Some(ledger) = &self.ctx.ledger {
            let current = ledger.current(user).await.map_err(|e| self.fail(stage, e))?;
            if current.as_ref() != Some(&commitment) {
                let mismatch = RuleEncodingError::CommitmentMismatch {
                    expected: commitment.to_string(),
                    actual: current.map_or_else(|| "nothing".to_string(), |c| c.to_string()),
                };
                return Err(self.fail(stage, mismatch));
            }
        }

        let result = self
            .ctx
            .verifier
            .verify(&artifact, &commitment, intent.destination(), intent.amount())
            .await;
        let payload = json!({
            "proof_id": artifact.proof_id,
            "mode": result.mode,
            "trust_tier": result.trust_tier,
            "authorized": result.authorized,
            "fallback_reason": result.fallback_reason,
        });
        let record =
            AuthorizationRecord::new(self.process_id, user.clone(), commitment, artifact, result);
        let status = if record.verified() {
            StageStatus::Completed
        } else {
            StageStatus::Failed
        };
        self.emit(stage, status, payload);
        Ok(record)
    }

    async fn execute(
        &self,
        record: &AuthorizationRecord,
        intent: &PaymentIntent,
    ) -> Result<Option<ExecutionReceipt>, PipelineError> {
        let Some(executor) = &self.ctx.executor else {
            return Ok(None);
        };
        let stage = Stage::Execute;
        self.emit(stage, StageStatus::Active, json!({}));
        let payment = AuthorizedPayment::from_record(record, intent).map_err(|e| self.fail(stage, e))?;
        let receipt = executor
            .execute(payment)
            .await
            .map_err(|e| self.fail(stage, e))?;
        self.emit(
            stage,
            StageStatus::Completed,
            json!({ "reference": receipt.reference }),
        );
        Ok(Some(receipt))
    }

    fn emit(&self, stage: Stage, status: StageStatus, payload: serde_json::Value) {
        self.ctx
            .observer
            .observe(&StageEvent::new(self.process_id, stage, status, payload));
    }

    fn fail(&self, stage: Stage, kind: impl Into<PipelineErrorKind>) -> PipelineError {
        let err = PipelineError::new(self.process_id, stage, kind);
        self.emit(stage, StageStatus::Failed, json!({ "error": err.kind.to_string() }));
        err
    }
}
