//! # Pipeline Stages
//!
//! Strict linear order, terminal on the first failure:
//!
//! ```text
//! CommitRules → DeriveIntent → GenerateProof → Verify → AuthorizedForExecution → Execute
//! ```
//!
//! `GenerateProof` fails when the public outputs show a rule violation;
//! `Verify` fails when the verifier does not authorize. `Execute` only runs
//! when an execution collaborator is configured.

use serde::{Deserialize, Serialize};
use zkpay_core::{ProcessId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CommitRules,
    DeriveIntent,
    GenerateProof,
    Verify,
    AuthorizedForExecution,
    Execute,
}

impl Stage {
    pub const ORDER: [Stage; 6] = [
        Self::CommitRules,
        Self::DeriveIntent,
        Self::GenerateProof,
        Self::Verify,
        Self::AuthorizedForExecution,
        Self::Execute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommitRules => "commit_rules",
            Self::DeriveIntent => "derive_intent",
            Self::GenerateProof => "generate_proof",
            Self::Verify => "verify",
            Self::AuthorizedForExecution => "authorized_for_execution",
            Self::Execute => "execute",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Active,
    Completed,
    Failed,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage transition of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    pub process_id: ProcessId,
    pub stage: Stage,
    pub status: StageStatus,
    /// Stage-specific detail. Never carries the private destination or
    /// amount.
    pub payload: serde_json::Value,
    pub at: Timestamp,
}

impl StageEvent {
    pub fn new(
        process_id: ProcessId,
        stage: Stage,
        status: StageStatus,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            process_id,
            stage,
            status,
            payload,
            at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_strictly_increasing() {
        assert!(Stage::ORDER.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn event_serializes_with_snake_case_tags() {
        let event = StageEvent::new(
            ProcessId::new(),
            Stage::GenerateProof,
            StageStatus::Failed,
            serde_json::json!({"violations": ["amount_exceeds_limit"]}),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["stage"], "generate_proof");
        assert_eq!(json["status"], "failed");
        assert_eq!(Stage::AuthorizedForExecution.to_string(), "authorized_for_execution");
    }
}
