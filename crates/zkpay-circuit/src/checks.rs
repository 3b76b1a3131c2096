//! # Rule Checks
//!
//! The closed set of checks a payment must pass. Each kind has a clear
//! evaluation (used for direct evaluation and to derive honest outputs)
//! and a constraint synthesis over the allocated circuit wires. The
//! overall result is a fold over AND in [`CheckKind::ALL`] order.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use serde::{Deserialize, Serialize};

use crate::gadgets::less_or_equal;
use crate::input::{CircuitInput, AMOUNT_BITS, HOUR_BITS, WHITELIST_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Destination is one of the whitelisted slots.
    Membership,
    /// `amount <= max_amount`.
    Amount,
    /// `min_hour <= hour <= max_hour`.
    TimeWindow,
}

/// Range-checked wires the checks read.
pub(crate) struct Wires {
    pub destination: FpVar<Fr>,
    pub allowed: Vec<FpVar<Fr>>,
    pub amount: FpVar<Fr>,
    pub max_amount: FpVar<Fr>,
    pub hour: FpVar<Fr>,
    pub min_hour: FpVar<Fr>,
    pub max_hour: FpVar<Fr>,
}

impl CheckKind {
    pub const ALL: [CheckKind; 3] = [Self::Membership, Self::Amount, Self::TimeWindow];

    /// Stable code reported when this check fails.
    pub fn violation_code(&self) -> &'static str {
        match self {
            Self::Membership => "destination_not_whitelisted",
            Self::Amount => "amount_exceeds_limit",
            Self::TimeWindow => "outside_allowed_hours",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::Amount => "amount",
            Self::TimeWindow => "time_window",
        }
    }

    /// Evaluate in the clear.
    pub fn evaluate(&self, input: &CircuitInput) -> bool {
        let params = input.params();
        match self {
            Self::Membership => params.allowed().contains(&input.destination()),
            Self::Amount => input.amount() <= params.max_amount(),
            Self::TimeWindow => {
                let hour = input.hour();
                params.min_hour() <= hour && hour <= params.max_hour()
            }
        }
    }

    pub(crate) fn synthesize(
        &self,
        cs: &ConstraintSystemRef<Fr>,
        wires: &Wires,
    ) -> Result<Boolean<Fr>, SynthesisError> {
        match self {
            Self::Membership => {
                let mut hits = Vec::with_capacity(WHITELIST_SLOTS);
                for slot in &wires.allowed {
                    hits.push(wires.destination.is_eq(slot)?);
                }
                Boolean::kary_or(&hits)
            }
            Self::Amount => less_or_equal(cs, &wires.amount, &wires.max_amount, AMOUNT_BITS),
            Self::TimeWindow => {
                let after_start = less_or_equal(cs, &wires.min_hour, &wires.hour, HOUR_BITS)?;
                let before_end = less_or_equal(cs, &wires.hour, &wires.max_hour, HOUR_BITS)?;
                after_start.and(&before_end)
            }
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::padding_slot;
    use crate::input::RuleParameters;

    fn input(dest: u64, amount: u64, ts: u64) -> CircuitInput {
        let params = RuleParameters::new(
            [Fr::from(1u64), Fr::from(2u64), padding_slot()],
            100,
            9,
            18,
        )
        .unwrap();
        CircuitInput::from_parts(Fr::from(dest), amount, ts, params).unwrap()
    }

    #[test]
    fn clear_evaluation() {
        let at_14 = 14 * 3_600;
        let i = input(2, 75, at_14);
        assert!(CheckKind::ALL.iter().all(|k| k.evaluate(&i)));

        assert!(!CheckKind::Membership.evaluate(&input(3, 75, at_14)));
        assert!(!CheckKind::Amount.evaluate(&input(1, 101, at_14)));
        assert!(CheckKind::Amount.evaluate(&input(1, 100, at_14)));
        assert!(!CheckKind::TimeWindow.evaluate(&input(1, 1, 8 * 3_600 + 3_599)));
        assert!(CheckKind::TimeWindow.evaluate(&input(1, 1, 18 * 3_600 + 3_599)));
        assert!(!CheckKind::TimeWindow.evaluate(&input(1, 1, 19 * 3_600)));
    }

    #[test]
    fn violation_codes_are_stable() {
        let codes: Vec<_> = CheckKind::ALL.iter().map(|k| k.violation_code()).collect();
        assert_eq!(
            codes,
            ["destination_not_whitelisted", "amount_exceeds_limit", "outside_allowed_hours"]
        );
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&CheckKind::TimeWindow).unwrap(), "\"time_window\"");
        assert_eq!(CheckKind::TimeWindow.to_string(), "time_window");
    }
}
