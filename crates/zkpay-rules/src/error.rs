//! Error types for rule construction, commitment, and payment intents.

use thiserror::Error;
use zkpay_core::CanonicalizationError;

use crate::destination::DestinationError;

/// A rule set could not be constructed, committed, or re-verified.
///
/// Always fatal at the commit stage: no proof work starts on rules that
/// fail here.
#[derive(Error, Debug)]
pub enum RuleEncodingError {
    #[error("rule set has no allowed destinations")]
    NoDestinations,

    #[error("rule set allows {count} destinations; maximum is {max}")]
    TooManyDestinations { count: usize, max: usize },

    #[error("invalid destination at position {index}: {source}")]
    InvalidDestination {
        index: usize,
        #[source]
        source: DestinationError,
    },

    #[error("destination {0:?} is listed more than once")]
    DuplicateDestination(String),

    #[error("hour {0} is outside 0..=23")]
    HourOutOfRange(u8),

    #[error("hour window start {start} is after end {end}")]
    InvertedHourWindow { start: u8, end: u8 },

    #[error("rule canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The rules in use no longer match the commitment recorded earlier.
    #[error("rule commitment mismatch: expected {expected}, found {actual}")]
    CommitmentMismatch { expected: String, actual: String },
}

/// A payment intent failed basic shape checks before any circuit work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("invalid destination: {0}")]
    Destination(#[from] DestinationError),

    #[error("payment amount must be greater than zero")]
    ZeroAmount,
}
