//! # Error Types
//!
//! Errors raised by the foundational types. Higher crates define their own
//! `thiserror` enums and wrap these where a core operation can fail.

use thiserror::Error;

/// Top-level error type for `zkpay-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A digest string could not be parsed.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// A timestamp was malformed, non-UTC, or out of range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An identifier string could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations; use an integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
