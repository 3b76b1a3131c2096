//! Pipeline failures. Each is terminal for its process id and names the
//! stage it happened in.

use thiserror::Error;
use zkpay_core::ProcessId;
use zkpay_rules::RuleEncodingError;
use zkpay_zkp::ProverError;

use crate::executor::ExecutionError;
use crate::ledger::LedgerError;
use crate::stage::Stage;

#[derive(Error, Debug)]
#[error("process {process_id} failed at {stage}: {kind}")]
pub struct PipelineError {
    pub process_id: ProcessId,
    pub stage: Stage,
    #[source]
    pub kind: PipelineErrorKind,
}

#[derive(Error, Debug)]
pub enum PipelineErrorKind {
    #[error(transparent)]
    RuleEncoding(#[from] RuleEncodingError),

    #[error(transparent)]
    Prover(#[from] ProverError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("proof task did not complete: {0}")]
    Task(String),
}

impl PipelineError {
    pub fn new(process_id: ProcessId, stage: Stage, kind: impl Into<PipelineErrorKind>) -> Self {
        Self {
            process_id,
            stage,
            kind: kind.into(),
        }
    }
}
