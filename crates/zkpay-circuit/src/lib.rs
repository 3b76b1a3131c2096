//! # zkpay-circuit — Rule Validation Constraint System
//!
//! The arithmetic core of zkpay: a fixed R1CS over the BN254 scalar field
//! that proves a private payment satisfies a public rule set.
//!
//! - **Field** (`field.rs`): destination identifiers to field elements via
//!   a domain-separated SHA-256 digest truncated to 248 bits.
//! - **Gadgets** (`gadgets.rs`): range checks, unsigned comparators, and
//!   integer division with remainder.
//! - **Input** (`input.rs`): public `RuleParameters` and the full
//!   `CircuitInput`, with the bit widths fixed at setup.
//! - **Checks** (`checks.rs`): the closed `CheckKind` enum. Each kind has
//!   a clear evaluation and a constraint synthesis.
//! - **Circuit** (`circuit.rs`): `RuleValidationCircuit`, which allocates
//!   the public inputs, derives the hour in-circuit, and binds the four
//!   public output bits to the computed results.
//! - **Outputs** (`outputs.rs`): `PublicOutputs`, the revealed
//!   `[overall, destination, amount, time]` bits.
//!
//! The field has 254 bits; the widest wire is the 249-bit comparator
//! intermediate, so no arithmetic here can wrap.

pub mod checks;
pub mod circuit;
pub mod error;
pub mod field;
pub mod gadgets;
pub mod input;
pub mod outputs;

pub use checks::CheckKind;
pub use circuit::{CircuitShape, RuleValidationCircuit, CIRCUIT_ID, NUM_PUBLIC_INPUTS};
pub use error::CircuitError;
pub use field::{destination_to_field, fr_from_hex, fr_to_hex, padding_slot, DESTINATION_BITS};
pub use input::{CircuitInput, RuleParameters, AMOUNT_BITS, HOUR_BITS, TIMESTAMP_BITS};
pub use outputs::PublicOutputs;

/// Scalar field the circuit is defined over.
pub use ark_bn254::Fr;
