//! # zkpay-zkp — Proof Generation and Verification
//!
//! - **Traits** (`traits.rs`): the sealed `ProofSystem` trait. The rest of
//!   the crate only proves and verifies through it.
//! - **Groth16** (`groth16.rs`): `ark-groth16` over BN254, specialised to
//!   the rule validation circuit. Proofs are 128 bytes compressed.
//! - **Artifacts** (`artifacts.rs`): the on-disk key pair and its manifest,
//!   checked against the compiled circuit on every load.
//! - **Prover** (`prover.rs`): intent + rules + commitment to a
//!   `ProofArtifact`, with a direct-evaluation fallback when keys are
//!   unavailable.
//! - **Oracle** (`oracle/`): the `VerificationOracle` seam, a JSON-RPC
//!   client for a verifier contract, and an in-process keyed oracle.
//! - **Verifier** (`verifier.rs`): on-chain verification under a timeout,
//!   downgrading to local structural checks on oracle failure.

pub mod artifacts;
pub mod clock;
pub mod groth16;
pub mod oracle;
pub mod proof;
pub mod prover;
pub mod traits;
pub mod verifier;

pub use artifacts::{ArtifactError, ArtifactStore, KeyManifest};
pub use clock::{Clock, FixedClock, SystemClock};
pub use groth16::{Groth16Proof, Groth16ProofSystem, CURVE, PROOF_SIZE};
pub use oracle::{
    JsonRpcOracle, KeyedOracle, OracleConfig, OracleError, OracleSubmission, OracleVerdict,
    VerificationOracle,
};
pub use proof::{ProofArtifact, ProofPayload, TrustTier};
pub use prover::{Prover, ProverError};
pub use traits::{ProofError, ProofSystem, VerifyError};
pub use verifier::{
    LocalStructuralVerifier, OnChainVerifier, StrategyVerdict, VerificationMode,
    VerificationResult, VerificationStrategy, Verifier,
};
