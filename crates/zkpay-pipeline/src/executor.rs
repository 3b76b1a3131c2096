//! # Payment Execution
//!
//! The collaborator that moves funds. It is handed an [`AuthorizedPayment`],
//! which can only be built from an [`AuthorizationRecord`] whose
//! verification succeeded, so an executor never sees an unverified payment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkpay_core::{ProcessId, ProofId, Timestamp};
use zkpay_rules::{Destination, PaymentIntent, RuleCommitment};
use zkpay_zkp::{TrustTier, VerificationMode};

use crate::record::AuthorizationRecord;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("record for process {0} is not verified")]
    NotAuthorized(ProcessId),

    #[error("payment execution failed: {0}")]
    Failed(String),
}

/// Permission to execute exactly one verified payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedPayment {
    process_id: ProcessId,
    proof_id: ProofId,
    rule_commitment: RuleCommitment,
    destination: Destination,
    amount: u64,
    verification_mode: VerificationMode,
    trust_tier: TrustTier,
}

impl AuthorizedPayment {
    pub fn from_record(
        record: &AuthorizationRecord,
        intent: &PaymentIntent,
    ) -> Result<Self, ExecutionError> {
        if !record.verified() {
            return Err(ExecutionError::NotAuthorized(record.process_id()));
        }
        Ok(Self {
            process_id: record.process_id(),
            proof_id: record.proof_artifact().proof_id,
            rule_commitment: record.rule_commitment().clone(),
            destination: intent.destination().clone(),
            amount: intent.amount(),
            verification_mode: record.verification_mode(),
            trust_tier: record.trust_tier(),
        })
    }

    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }

    pub fn proof_id(&self) -> ProofId {
        self.proof_id
    }

    pub fn rule_commitment(&self) -> &RuleCommitment {
        &self.rule_commitment
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn verification_mode(&self) -> VerificationMode {
        self.verification_mode
    }

    pub fn trust_tier(&self) -> TrustTier {
        self.trust_tier
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub reference: String,
    pub executed_at: Timestamp,
}

#[async_trait]
pub trait PaymentExecutor: Send + Sync {
    async fn execute(&self, payment: AuthorizedPayment) -> Result<ExecutionReceipt, ExecutionError>;
}

/// Logs the payment and moves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunExecutor;

#[async_trait]
impl PaymentExecutor for DryRunExecutor {
    async fn execute(&self, payment: AuthorizedPayment) -> Result<ExecutionReceipt, ExecutionError> {
        tracing::info!(
            process_id = %payment.process_id,
            proof_id = %payment.proof_id,
            mode = %payment.verification_mode,
            "dry run: payment would be released"
        );
        Ok(ExecutionReceipt {
            reference: format!("dry-run:{}", payment.process_id.as_uuid()),
            executed_at: Timestamp::now(),
        })
    }
}
