//! # Proof System Trait
//!
//! The seam between zkpay and the pairing-based proving backend. The
//! prover, the artifact store, and the keyed oracle only talk to a
//! `ProofSystem`; they never touch curve points directly.
//!
//! ## Security Invariant
//!
//! The trait is sealed. The only implementation is the Groth16 backend
//! over BN254, so no caller can slip in a system with weaker soundness.
//! Implementations are `Send + Sync` and hold no per-proof state.

use thiserror::Error;

/// Error during key generation or proof generation.
#[derive(Error, Debug)]
pub enum ProofError {
    /// Constraint synthesis failed, or the assignment does not satisfy
    /// the circuit.
    #[error("circuit error: {0}")]
    Circuit(String),
    /// The proving backend failed.
    #[error("prover error: {0}")]
    Prover(String),
    /// A proof or key could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Error during proof verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The proof bytes are not a valid proof.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
    /// The public inputs do not match the verifying key.
    #[error("key mismatch: {0}")]
    KeyMismatch(String),
}

/// A zero-knowledge proof system for one fixed circuit family.
pub trait ProofSystem: Send + Sync + private::Sealed {
    /// The proof produced by this system.
    type Proof: Clone + Send + Sync;
    /// The verifying key.
    type VerifyingKey: Clone + Send + Sync;
    /// The proving key.
    type ProvingKey: Send + Sync;
    /// An assigned circuit instance.
    type Circuit;
    /// One public input value.
    type PublicInput;

    /// Generate a proof for an assigned circuit.
    fn prove(&self, pk: &Self::ProvingKey, circuit: Self::Circuit)
        -> Result<Self::Proof, ProofError>;

    /// Verify a proof against its public inputs.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_inputs: &[Self::PublicInput],
    ) -> Result<bool, VerifyError>;
}

mod private {
    pub trait Sealed {}
    impl Sealed for crate::groth16::Groth16ProofSystem {}
}
