//! # Circuit Inputs
//!
//! `RuleParameters` is the public half (whitelist slots, cap, hour window),
//! a pure function of a `RuleSet`. `CircuitInput` adds the private payment
//! facts: mapped destination, amount, and the sampled timestamp.
//!
//! ## Bit Widths
//!
//! Fixed at setup; a proving key is only valid for these values.
//!
//! | Wire | Width |
//! |------|-------|
//! | amount, max_amount | [`AMOUNT_BITS`] = 64 |
//! | timestamp seconds | [`TIMESTAMP_BITS`] = 64 |
//! | min_hour, max_hour, derived hour | [`HOUR_BITS`] = 5 |
//! | private destination | [`DESTINATION_BITS`] = 248 |

use ark_bn254::Fr;
use zkpay_core::temporal::{SECONDS_PER_DAY, SECONDS_PER_HOUR};
use zkpay_rules::{PaymentIntent, RuleSet, MAX_DESTINATIONS};

use crate::error::CircuitError;
use crate::field::{destination_to_field, fits_in_bits, padding_slot, DESTINATION_BITS};
use crate::outputs::PublicOutputs;

pub const AMOUNT_BITS: usize = 64;
pub const TIMESTAMP_BITS: usize = 64;
pub const HOUR_BITS: usize = 5;

/// Whitelist slots in the public input vector.
pub const WHITELIST_SLOTS: usize = MAX_DESTINATIONS;

/// Public rule parameters in circuit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleParameters {
    allowed: [Fr; WHITELIST_SLOTS],
    max_amount: u64,
    min_hour: u8,
    max_hour: u8,
}

impl RuleParameters {
    /// Map a validated rule set. Unused slots are padded.
    pub fn from_rules(rules: &RuleSet) -> Self {
        let mut allowed = [padding_slot(); WHITELIST_SLOTS];
        for (slot, d) in allowed.iter_mut().zip(rules.allowed_destinations()) {
            *slot = destination_to_field(d);
        }
        let hours = rules.allowed_hours();
        Self {
            allowed,
            max_amount: rules.max_amount(),
            min_hour: hours.start,
            max_hour: hours.end,
        }
    }

    /// Build from raw circuit values.
    ///
    /// # Errors
    ///
    /// `ValueTooWide` if an hour bound needs more than [`HOUR_BITS`] bits
    /// or a whitelist slot is neither a 248-bit value nor the padding slot.
    pub fn new(
        allowed: [Fr; WHITELIST_SLOTS],
        max_amount: u64,
        min_hour: u8,
        max_hour: u8,
    ) -> Result<Self, CircuitError> {
        for h in [min_hour, max_hour] {
            if usize::from(h) >> HOUR_BITS != 0 {
                return Err(CircuitError::ValueTooWide {
                    what: "hour bound",
                    bits: HOUR_BITS,
                });
            }
        }
        let pad = padding_slot();
        if allowed
            .iter()
            .any(|a| *a != pad && !fits_in_bits(*a, DESTINATION_BITS))
        {
            return Err(CircuitError::ValueTooWide {
                what: "whitelist slot",
                bits: DESTINATION_BITS,
            });
        }
        Ok(Self {
            allowed,
            max_amount,
            min_hour,
            max_hour,
        })
    }

    pub fn allowed(&self) -> &[Fr; WHITELIST_SLOTS] {
        &self.allowed
    }

    pub fn max_amount(&self) -> u64 {
        self.max_amount
    }

    pub fn min_hour(&self) -> u8 {
        self.min_hour
    }

    pub fn max_hour(&self) -> u8 {
        self.max_hour
    }

    /// The full public input vector, in allocation order:
    /// `[overall, destination, amount, time, allowed0, allowed1, allowed2,
    /// max_amount, min_hour, max_hour]`.
    pub fn public_inputs(&self, outputs: &PublicOutputs) -> Vec<Fr> {
        let mut v: Vec<Fr> = outputs
            .bits()
            .iter()
            .map(|b| Fr::from(u64::from(*b)))
            .collect();
        v.extend_from_slice(&self.allowed);
        v.push(Fr::from(self.max_amount));
        v.push(Fr::from(u64::from(self.min_hour)));
        v.push(Fr::from(u64::from(self.max_hour)));
        v
    }
}

/// Everything the circuit needs for one proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitInput {
    pub(crate) destination: Fr,
    pub(crate) amount: u64,
    pub(crate) timestamp_secs: u64,
    pub(crate) params: RuleParameters,
}

impl CircuitInput {
    pub fn new(intent: &PaymentIntent, rules: &RuleSet, timestamp_secs: u64) -> Self {
        Self {
            destination: destination_to_field(intent.destination()),
            amount: intent.amount(),
            timestamp_secs,
            params: RuleParameters::from_rules(rules),
        }
    }

    /// Build from raw values; the destination must fit [`DESTINATION_BITS`].
    pub fn from_parts(
        destination: Fr,
        amount: u64,
        timestamp_secs: u64,
        params: RuleParameters,
    ) -> Result<Self, CircuitError> {
        if !fits_in_bits(destination, DESTINATION_BITS) {
            return Err(CircuitError::ValueTooWide {
                what: "destination",
                bits: DESTINATION_BITS,
            });
        }
        Ok(Self {
            destination,
            amount,
            timestamp_secs,
            params,
        })
    }

    pub fn destination(&self) -> Fr {
        self.destination
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn timestamp_secs(&self) -> u64 {
        self.timestamp_secs
    }

    pub fn params(&self) -> &RuleParameters {
        &self.params
    }

    /// `(timestamp mod 86400) div 3600`, always in `0..=23`.
    pub fn hour(&self) -> u8 {
        (self.timestamp_secs % SECONDS_PER_DAY / SECONDS_PER_HOUR) as u8
    }
}
