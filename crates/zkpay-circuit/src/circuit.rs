//! # Rule Validation Circuit
//!
//! R1CS over the BN254 scalar field proving that a private payment
//! (destination, amount, timestamp) satisfies public rule parameters.
//!
//! ## Layout
//!
//! Public inputs, in allocation order:
//!
//! ```text
//! [overall, destination_ok, amount_ok, time_ok,
//!  allowed0, allowed1, allowed2, max_amount, min_hour, max_hour]
//! ```
//!
//! The four output bits are allocated as public booleans and constrained
//! equal to the internally computed results, so a proof for forged output
//! bits does not exist. The hour is derived in-circuit as
//! `(timestamp mod 86400) div 3600` with the division gadget; it is never a
//! free witness.
//!
//! ## Security Invariant
//!
//! The private destination is range-checked to 248 bits. Padding slots
//! hold 2^248, so an unused slot can never be matched.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystem, ConstraintSystemRef, SynthesisError, SynthesisMode,
};
use serde::{Deserialize, Serialize};
use zkpay_core::temporal::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

use crate::checks::{CheckKind, Wires};
use crate::error::CircuitError;
use crate::field::DESTINATION_BITS;
use crate::gadgets::{div_rem, range_check};
use crate::input::{CircuitInput, AMOUNT_BITS, HOUR_BITS, TIMESTAMP_BITS, WHITELIST_SLOTS};
use crate::outputs::PublicOutputs;

/// Identifies this circuit layout in key manifests.
pub const CIRCUIT_ID: &str = "zkpay.rule_validation/v1";

/// Public inputs, excluding the constant one.
pub const NUM_PUBLIC_INPUTS: usize = 10;

/// Bits needed for a remainder mod 86400.
const SECONDS_OF_DAY_BITS: usize = 17;

/// Bits needed for a remainder mod 3600.
const SECONDS_OF_HOUR_BITS: usize = 12;

/// Size of the constraint system, independent of any assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitShape {
    pub num_constraints: usize,
    pub num_public_inputs: usize,
    pub num_witnesses: usize,
}

#[derive(Debug, Clone)]
pub struct RuleValidationCircuit {
    pub(crate) input: Option<CircuitInput>,
    pub(crate) claimed: Option<PublicOutputs>,
}

impl RuleValidationCircuit {
    /// Unassigned circuit for key generation.
    pub fn blank() -> Self {
        Self {
            input: None,
            claimed: None,
        }
    }

    /// Assigned circuit claiming the honestly evaluated outputs.
    pub fn new(input: CircuitInput) -> Self {
        let claimed = PublicOutputs::evaluate(&input);
        Self {
            input: Some(input),
            claimed: Some(claimed),
        }
    }

    pub fn input(&self) -> Option<&CircuitInput> {
        self.input.as_ref()
    }

    pub fn outputs(&self) -> Option<PublicOutputs> {
        self.claimed
    }

    /// Public input vector for verification.
    pub fn public_inputs(&self) -> Option<Vec<Fr>> {
        let input = self.input.as_ref()?;
        let outputs = self.claimed?;
        Some(input.params.public_inputs(&outputs))
    }

    /// Synthesize with the assignment and report whether every constraint
    /// holds.
    pub fn check_satisfied(&self) -> Result<bool, CircuitError> {
        let cs = ConstraintSystem::<Fr>::new_ref();
        self.clone().generate_constraints(cs.clone())?;
        Ok(cs.is_satisfied()?)
    }

    /// Constraint, public input, and witness counts.
    pub fn shape() -> Result<CircuitShape, CircuitError> {
        let cs = ConstraintSystem::<Fr>::new_ref();
        cs.set_mode(SynthesisMode::Setup);
        Self::blank().generate_constraints(cs.clone())?;
        Ok(CircuitShape {
            num_constraints: cs.num_constraints(),
            num_public_inputs: cs.num_instance_variables() - 1,
            num_witnesses: cs.num_witness_variables(),
        })
    }
}

fn assigned<T>(v: Option<T>) -> Result<T, SynthesisError> {
    v.ok_or(SynthesisError::AssignmentMissing)
}

impl ConstraintSynthesizer<Fr> for RuleValidationCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let input = self.input.as_ref();
        let params = input.map(|i| &i.params);
        let claimed = self.claimed;

        // Public inputs, fixed order.
        let out_overall = Boolean::new_input(cs.clone(), || assigned(claimed.map(|o| o.overall)))?;
        let out_destination =
            Boolean::new_input(cs.clone(), || assigned(claimed.map(|o| o.destination)))?;
        let out_amount = Boolean::new_input(cs.clone(), || assigned(claimed.map(|o| o.amount)))?;
        let out_time = Boolean::new_input(cs.clone(), || assigned(claimed.map(|o| o.time)))?;

        let mut allowed = Vec::with_capacity(WHITELIST_SLOTS);
        for slot in 0..WHITELIST_SLOTS {
            allowed.push(FpVar::new_input(cs.clone(), || {
                assigned(params.map(|p| p.allowed()[slot]))
            })?);
        }
        let max_amount = FpVar::new_input(cs.clone(), || {
            assigned(params.map(|p| Fr::from(p.max_amount())))
        })?;
        let min_hour = FpVar::new_input(cs.clone(), || {
            assigned(params.map(|p| Fr::from(u64::from(p.min_hour()))))
        })?;
        let max_hour = FpVar::new_input(cs.clone(), || {
            assigned(params.map(|p| Fr::from(u64::from(p.max_hour()))))
        })?;

        // Private witnesses.
        let destination = FpVar::new_witness(cs.clone(), || assigned(input.map(|i| i.destination)))?;
        let amount = FpVar::new_witness(cs.clone(), || assigned(input.map(|i| Fr::from(i.amount))))?;
        let timestamp = FpVar::new_witness(cs.clone(), || {
            assigned(input.map(|i| Fr::from(i.timestamp_secs)))
        })?;

        range_check(&cs, &destination, DESTINATION_BITS)?;
        range_check(&cs, &amount, AMOUNT_BITS)?;
        range_check(&cs, &max_amount, AMOUNT_BITS)?;
        range_check(&cs, &min_hour, HOUR_BITS)?;
        range_check(&cs, &max_hour, HOUR_BITS)?;
        range_check(&cs, &timestamp, TIMESTAMP_BITS)?;

        let day = div_rem(
            &cs,
            &timestamp,
            &FpVar::constant(Fr::from(SECONDS_PER_DAY)),
            TIMESTAMP_BITS,
            SECONDS_OF_DAY_BITS,
        )?;
        let hour = div_rem(
            &cs,
            &day.remainder,
            &FpVar::constant(Fr::from(SECONDS_PER_HOUR)),
            HOUR_BITS,
            SECONDS_OF_HOUR_BITS,
        )?
        .quotient;

        let wires = Wires {
            destination,
            allowed,
            amount,
            max_amount,
            hour,
            min_hour,
            max_hour,
        };

        let mut results = Vec::with_capacity(CheckKind::ALL.len());
        for kind in CheckKind::ALL {
            results.push(kind.synthesize(&cs, &wires)?);
        }
        let overall = results
            .iter()
            .try_fold(Boolean::TRUE, |acc, r| acc.and(r))?;

        for (claimed_bit, computed) in [&out_destination, &out_amount, &out_time]
            .into_iter()
            .zip(&results)
        {
            claimed_bit.enforce_equal(computed)?;
        }
        out_overall.enforce_equal(&overall)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::padding_slot;
    use crate::input::RuleParameters;

    const D1: u64 = 11;
    const D2: u64 = 22;
    const D3: u64 = 33;

    fn params() -> RuleParameters {
        RuleParameters::new([Fr::from(D1), Fr::from(D2), padding_slot()], 100, 9, 18).unwrap()
    }

    fn at_hour(h: u64) -> u64 {
        // 2026-01-15T00:00:00Z plus h hours and a few minutes.
        1_768_435_200 + h * 3_600 + 125
    }

    fn circuit(dest: u64, amount: u64, hour: u64) -> RuleValidationCircuit {
        RuleValidationCircuit::new(
            CircuitInput::from_parts(Fr::from(dest), amount, at_hour(hour), params()).unwrap(),
        )
    }

    #[test]
    fn all_eight_combinations() {
        for dest_ok in [false, true] {
            for amount_ok in [false, true] {
                for time_ok in [false, true] {
                    let c = circuit(
                        if dest_ok { D1 } else { D3 },
                        if amount_ok { 75 } else { 150 },
                        if time_ok { 14 } else { 20 },
                    );
                    let out = c.outputs().unwrap();
                    assert_eq!(
                        out.bits(),
                        [dest_ok && amount_ok && time_ok, dest_ok, amount_ok, time_ok]
                    );
                    assert!(c.check_satisfied().unwrap(), "{dest_ok} {amount_ok} {time_ok}");
                }
            }
        }
    }

    #[test]
    fn boundary_values_pass() {
        let c = circuit(D2, 100, 9);
        assert!(c.outputs().unwrap().all_pass());
        let c = circuit(D2, 100, 18);
        assert!(c.outputs().unwrap().all_pass());
        assert!(c.check_satisfied().unwrap());
    }

    #[test]
    fn forged_outputs_are_unsatisfiable() {
        let mut c = circuit(D3, 150, 14);
        c.claimed = Some(PublicOutputs {
            overall: true,
            destination: true,
            amount: true,
            time: true,
        });
        assert!(!c.check_satisfied().unwrap());
    }

    #[test]
    fn inconsistent_overall_is_unsatisfiable() {
        let mut c = circuit(D1, 150, 14);
        c.claimed = Some(PublicOutputs {
            overall: true,
            destination: true,
            amount: false,
            time: true,
        });
        assert!(!c.check_satisfied().unwrap());
    }

    #[test]
    fn padding_slot_cannot_be_claimed() {
        let input = CircuitInput {
            destination: padding_slot(),
            amount: 1,
            timestamp_secs: at_hour(12),
            params: params(),
        };
        let c = RuleValidationCircuit::new(input);
        // Clear evaluation says "member"; the range check refuses it.
        assert!(c.outputs().unwrap().destination);
        assert!(!c.check_satisfied().unwrap());
    }

    #[test]
    fn public_inputs_match_allocation() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let c = circuit(D1, 75, 14);
        let expected = c.public_inputs().unwrap();
        c.generate_constraints(cs.clone()).unwrap();
        let instance = cs.borrow().unwrap().instance_assignment.clone();
        assert_eq!(instance.len(), NUM_PUBLIC_INPUTS + 1);
        assert_eq!(&instance[1..], expected.as_slice());
    }

    #[test]
    fn shape_is_stable() {
        let a = RuleValidationCircuit::shape().unwrap();
        let b = RuleValidationCircuit::shape().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.num_public_inputs, NUM_PUBLIC_INPUTS);
        assert!(a.num_constraints > 0);
    }

    #[test]
    fn extreme_amounts_are_handled() {
        let p = RuleParameters::new([Fr::from(D1), padding_slot(), padding_slot()], u64::MAX, 0, 23)
            .unwrap();
        let c = RuleValidationCircuit::new(
            CircuitInput::from_parts(Fr::from(D1), u64::MAX, u64::MAX, p).unwrap(),
        );
        assert!(c.outputs().unwrap().all_pass());
        assert!(c.check_satisfied().unwrap());
    }
}
