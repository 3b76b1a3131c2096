//! # zkpay-core — Foundational Types
//!
//! The leaf of the zkpay dependency graph. Defines the primitives every
//! other crate relies on for deterministic, tamper-evident data handling.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All digest computation over structured
//!    data flows through `CanonicalBytes::new()` (RFC 8785 JCS, floats
//!    rejected). Rule commitments and artifact digests can therefore never
//!    be computed over a non-canonical serialization.
//!
//! 2. **Tagged content digests.** `ContentDigest` carries its algorithm tag
//!    so a commitment is self-describing.
//!
//! 3. **UTC-only timestamps.** `Timestamp` is UTC, second precision. The
//!    prover derives the execution hour from it, so there is exactly one
//!    notion of "when" in the system.
//!
//! 4. **Identifier newtypes.** `ProcessId`, `ProofId`, and `UserId` cannot
//!    be confused with each other or with bare strings.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkpay-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm, Sha256Accumulator};
pub use error::{CanonicalizationError, CoreError};
pub use identity::{ProcessId, ProofId, UserId};
pub use temporal::Timestamp;
