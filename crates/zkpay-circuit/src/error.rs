use ark_relations::r1cs::SynthesisError;
use thiserror::Error;

/// Errors raised while building or checking the rule validation circuit.
#[derive(Error, Debug)]
pub enum CircuitError {
    /// A value does not fit the bit width fixed for its wire.
    #[error("{what} does not fit in {bits} bits")]
    ValueTooWide { what: &'static str, bits: usize },

    /// A field element encoding was malformed or non-canonical.
    #[error("invalid field element encoding: {0}")]
    InvalidFieldEncoding(String),

    /// Constraint generation failed.
    #[error("constraint synthesis failed: {0}")]
    Synthesis(SynthesisError),
}

impl From<SynthesisError> for CircuitError {
    fn from(e: SynthesisError) -> Self {
        Self::Synthesis(e)
    }
}
