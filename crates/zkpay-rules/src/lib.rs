//! # zkpay-rules — Payment Rules and Commitments
//!
//! The user-facing half of the authorization model:
//!
//! - **Destination** (`destination.rs`): normalized payment identifiers.
//!
//! - **RuleSet** (`ruleset.rs`): up to three whitelisted destinations, an
//!   amount cap, and an inclusive UTC hour window. Validated at
//!   construction and at deserialization; immutable afterwards.
//!
//! - **PaymentIntent** (`intent.rs`): the private payment facts a proof is
//!   generated over (destination and amount; the hour is sampled by the
//!   prover, never supplied here).
//!
//! - **Commitment** (`commitment.rs`): `RuleEncoder` turns a `RuleSet` into
//!   a `RuleCommitment`, a SHA-256 digest over the JCS form of the rules
//!   with destinations sorted and a schema tag included.
//!
//! ## Security Invariant
//!
//! Commitments are computed from `CanonicalBytes` only, so presentation
//! order, whitespace, and key order never change a commitment, while any
//! change to a destination, the cap, or either hour bound does.

pub mod commitment;
pub mod destination;
pub mod error;
pub mod intent;
pub mod ruleset;

pub use commitment::{RuleCommitment, RuleEncoder, COMMITMENT_SCHEMA};
pub use destination::{Destination, DestinationError, MAX_DESTINATION_LEN};
pub use error::{IntentError, RuleEncodingError};
pub use intent::PaymentIntent;
pub use ruleset::{HourWindow, RuleSet, MAX_DESTINATIONS, MAX_HOUR};
