//! # Public Outputs
//!
//! The four bits a proof reveals: `[overall, destination, amount, time]`.
//!
//! Sub-results are public so a rejection can be explained without the
//! private payment facts. This leaks partial compliance (an observer learns
//! which rule failed); applications that need full privacy must drop the
//! sub-bits before publishing.
//!
//! `overall == destination && amount && time` is enforced by the circuit.
//! Values decoded from the wire are not trusted to satisfy it; see
//! [`PublicOutputs::is_consistent()`].

use serde::{Deserialize, Serialize};

use crate::checks::CheckKind;
use crate::error::CircuitError;
use crate::input::CircuitInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[u8; 4]", try_from = "[u8; 4]")]
pub struct PublicOutputs {
    pub overall: bool,
    pub destination: bool,
    pub amount: bool,
    pub time: bool,
}

impl PublicOutputs {
    /// Outputs for three sub-results, with `overall` derived.
    pub fn from_checks(destination: bool, amount: bool, time: bool) -> Self {
        Self {
            overall: destination && amount && time,
            destination,
            amount,
            time,
        }
    }

    /// Evaluate every check in the clear.
    pub fn evaluate(input: &CircuitInput) -> Self {
        Self::from_checks(
            CheckKind::Membership.evaluate(input),
            CheckKind::Amount.evaluate(input),
            CheckKind::TimeWindow.evaluate(input),
        )
    }

    pub fn bits(&self) -> [bool; 4] {
        [self.overall, self.destination, self.amount, self.time]
    }

    pub fn passed(&self, kind: CheckKind) -> bool {
        match kind {
            CheckKind::Membership => self.destination,
            CheckKind::Amount => self.amount,
            CheckKind::TimeWindow => self.time,
        }
    }

    /// `overall` equals the AND of the sub-results.
    pub fn is_consistent(&self) -> bool {
        let folded = CheckKind::ALL
            .iter()
            .fold(true, |acc, kind| acc && self.passed(*kind));
        self.overall == folded
    }

    /// All four bits are 1.
    pub fn all_pass(&self) -> bool {
        self.bits().iter().all(|b| *b)
    }

    /// Checks whose bit is 0, in `CheckKind::ALL` order.
    pub fn violations(&self) -> Vec<CheckKind> {
        CheckKind::ALL
            .iter()
            .copied()
            .filter(|k| !self.passed(*k))
            .collect()
    }
}

impl From<PublicOutputs> for [u8; 4] {
    fn from(o: PublicOutputs) -> Self {
        o.bits().map(u8::from)
    }
}

impl TryFrom<[u8; 4]> for PublicOutputs {
    type Error = CircuitError;

    fn try_from(bits: [u8; 4]) -> Result<Self, Self::Error> {
        let mut b = [false; 4];
        for (out, v) in b.iter_mut().zip(bits) {
            *out = match v {
                0 => false,
                1 => true,
                other => {
                    return Err(CircuitError::InvalidFieldEncoding(format!(
                        "public output bit must be 0 or 1, got {other}"
                    )))
                }
            };
        }
        Ok(Self {
            overall: b[0],
            destination: b[1],
            amount: b[2],
            time: b[3],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_is_and_of_parts() {
        for d in [false, true] {
            for a in [false, true] {
                for t in [false, true] {
                    let o = PublicOutputs::from_checks(d, a, t);
                    assert_eq!(o.overall, d && a && t);
                    assert!(o.is_consistent());
                    assert_eq!(o.all_pass(), d && a && t);
                }
            }
        }
    }

    #[test]
    fn forged_overall_is_inconsistent() {
        let forged = PublicOutputs {
            overall: true,
            destination: true,
            amount: false,
            time: true,
        };
        assert!(!forged.is_consistent());
        assert!(!forged.all_pass());
    }

    #[test]
    fn violations_listed_in_order() {
        let o = PublicOutputs::from_checks(false, true, false);
        assert_eq!(o.violations(), vec![CheckKind::Membership, CheckKind::TimeWindow]);
        assert!(PublicOutputs::from_checks(true, true, true).violations().is_empty());
    }

    #[test]
    fn wire_form_is_bit_array() {
        let o = PublicOutputs::from_checks(false, true, true);
        assert_eq!(serde_json::to_string(&o).unwrap(), "[0,0,1,1]");
        let back: PublicOutputs = serde_json::from_str("[0,0,1,1]").unwrap();
        assert_eq!(back, o);
    }

    #[test]
    fn wire_form_keeps_inconsistent_values_for_the_verifier() {
        let o: PublicOutputs = serde_json::from_str("[1,0,1,1]").unwrap();
        assert!(!o.is_consistent());
        assert!(serde_json::from_str::<PublicOutputs>("[2,0,1,1]").is_err());
    }
}
