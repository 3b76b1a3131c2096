//! # zkpay-pipeline — Proof-Gated Payment Authorization
//!
//! Orchestrates rule commitment, proof generation, verification and the
//! execution gate for one payment at a time.
//!
//! - **Context** (`context.rs`): `AuthorizationContext`, the explicitly
//!   passed set of handles (prover, verifier, ledger, executor, observer).
//! - **Pipeline** (`pipeline.rs`): `AuthorizationPipeline`, the strict
//!   `CommitRules → DeriveIntent → GenerateProof → Verify →
//!   AuthorizedForExecution → Execute` sequence.
//! - **Stages** (`stage.rs`) and **Observers** (`observer.rs`): the event
//!   stream emitted at every transition.
//! - **Records** (`record.rs`): `AuthorizationRecord`, `RuleViolation`, and
//!   the three terminal `AuthorizationOutcome` variants.
//! - **Collaborators** (`ledger.rs`, `executor.rs`): the rule ledger and
//!   payment executor seams, with in-memory and dry-run implementations.
//! - **Config** (`config.rs`): `PipelineConfig` from YAML plus `ZKPAY_*`
//!   environment overrides.

pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod observer;
pub mod pipeline;
pub mod record;
pub mod stage;

pub use config::{ConfigError, PipelineConfig, ENV_ARTIFACTS_DIR, ENV_ORACLE_URL};
pub use context::{verifier_for, AuthorizationContext};
pub use error::{PipelineError, PipelineErrorKind};
pub use executor::{
    AuthorizedPayment, DryRunExecutor, ExecutionError, ExecutionReceipt, PaymentExecutor,
};
pub use ledger::{InMemoryRuleLedger, LedgerError, RuleLedger};
pub use observer::{
    ChannelObserver, FanoutObserver, MemoryObserver, StageObserver, TracingObserver,
};
pub use pipeline::AuthorizationPipeline;
pub use record::{AuthorizationOutcome, AuthorizationRecord, RuleViolation};
pub use stage::{Stage, StageEvent, StageStatus};
