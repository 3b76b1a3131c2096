//! # Authorization Records and Outcomes
//!
//! Every run ends in exactly one [`AuthorizationOutcome`] variant or a
//! [`PipelineError`](crate::PipelineError). A rule violation is an outcome,
//! not an error: the rules worked and blocked the payment.

use serde::{Deserialize, Serialize};
use zkpay_circuit::{CheckKind, PublicOutputs};
use zkpay_core::{ProcessId, Timestamp, UserId};
use zkpay_rules::RuleCommitment;
use zkpay_zkp::{ProofArtifact, TrustTier, VerificationMode, VerificationResult};

use crate::executor::ExecutionReceipt;

/// The result of verifying one proof artifact. Built once, after
/// verification; never modified. Serialize-only: a record read back from
/// storage must not be able to release a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationRecord {
    process_id: ProcessId,
    user: UserId,
    rule_commitment: RuleCommitment,
    proof_artifact: ProofArtifact,
    verified: bool,
    verification_mode: VerificationMode,
    trust_tier: TrustTier,
    receipt: Option<String>,
    fallback_reason: Option<String>,
    timestamp: Timestamp,
}

impl AuthorizationRecord {
    pub(crate) fn new(
        process_id: ProcessId,
        user: UserId,
        rule_commitment: RuleCommitment,
        proof_artifact: ProofArtifact,
        verification: VerificationResult,
    ) -> Self {
        Self {
            process_id,
            user,
            rule_commitment,
            proof_artifact,
            verified: verification.authorized,
            verification_mode: verification.mode,
            trust_tier: verification.trust_tier,
            receipt: verification.receipt,
            fallback_reason: verification.fallback_reason,
            timestamp: Timestamp::now(),
        }
    }

    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn rule_commitment(&self) -> &RuleCommitment {
        &self.rule_commitment
    }

    pub fn proof_artifact(&self) -> &ProofArtifact {
        &self.proof_artifact
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn verification_mode(&self) -> VerificationMode {
        self.verification_mode
    }

    pub fn trust_tier(&self) -> TrustTier {
        self.trust_tier
    }

    pub fn receipt(&self) -> Option<&str> {
        self.receipt.as_deref()
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// The payment broke at least one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub process_id: ProcessId,
    pub rule_commitment: RuleCommitment,
    pub public_outputs: PublicOutputs,
    pub failed: Vec<CheckKind>,
}

impl RuleViolation {
    pub(crate) fn new(
        process_id: ProcessId,
        rule_commitment: RuleCommitment,
        public_outputs: PublicOutputs,
    ) -> Self {
        Self {
            process_id,
            rule_commitment,
            failed: public_outputs.violations(),
            public_outputs,
        }
    }

    /// `destination_not_whitelisted`, `amount_exceeds_limit`,
    /// `outside_allowed_hours`, for each failed check.
    pub fn codes(&self) -> Vec<&'static str> {
        self.failed.iter().map(CheckKind::violation_code).collect()
    }

    pub fn violated(&self, kind: CheckKind) -> bool {
        self.failed.contains(&kind)
    }
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "payment violates rules: {}", self.codes().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuthorizationOutcome {
    RejectedByRules(RuleViolation),
    VerificationFailed(AuthorizationRecord),
    Authorized {
        record: AuthorizationRecord,
        /// Present when an execution collaborator was configured.
        execution: Option<ExecutionReceipt>,
    },
}

impl AuthorizationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RejectedByRules(_) => "rejected_by_rules",
            Self::VerificationFailed(_) => "verification_failed",
            Self::Authorized { .. } => "authorized",
        }
    }

    pub fn process_id(&self) -> ProcessId {
        match self {
            Self::RejectedByRules(v) => v.process_id,
            Self::VerificationFailed(r) | Self::Authorized { record: r, .. } => r.process_id(),
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }

    pub fn record(&self) -> Option<&AuthorizationRecord> {
        match self {
            Self::RejectedByRules(_) => None,
            Self::VerificationFailed(r) | Self::Authorized { record: r, .. } => Some(r),
        }
    }
}
