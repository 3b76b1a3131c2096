//! # R1CS Gadgets
//!
//! Small constraint builders the rule circuit is assembled from: bit
//! decomposition (range checks), unsigned comparators, and integer
//! division with remainder.
//!
//! ## Security Invariant
//!
//! Every witness these gadgets introduce is pinned by constraints. The
//! comparators are only sound when both operands are already range-checked
//! to the declared width; callers do that once per wire at allocation.
//! The division gadget constrains `dividend == q * divisor + r` and
//! `r < divisor` with `q` and `r` range-checked, so a prover cannot pick an
//! inconsistent quotient.

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, PrimeField};
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::field::fr_to_u64;

/// Decompose `x` into `width` little-endian bits and constrain the
/// recomposition to equal `x`. Unsatisfiable if `x >= 2^width`.
pub fn range_check(
    cs: &ConstraintSystemRef<Fr>,
    x: &FpVar<Fr>,
    width: usize,
) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
    let mut bits = Vec::with_capacity(width);
    for i in 0..width {
        let bit = Boolean::new_witness(cs.clone(), || Ok(x.value()?.into_bigint().get_bit(i)))?;
        bits.push(bit);
    }
    Boolean::le_bits_to_fp_var(&bits)?.enforce_equal(x)?;
    Ok(bits)
}

/// `a <= b` for operands already range-checked to `width` bits.
///
/// `b - a + 2^width` lies in `(0, 2^(width+1))`; its top bit is set exactly
/// when `b >= a`.
pub fn less_or_equal(
    cs: &ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
    width: usize,
) -> Result<Boolean<Fr>, SynthesisError> {
    let offset = Fr::from(2u64).pow([width as u64]);
    let shifted = (b - a) + offset;
    let mut bits = range_check(cs, &shifted, width + 1)?;
    bits.pop().ok_or(SynthesisError::Unsatisfiable)
}

/// `a < b` for operands already range-checked to `width` bits.
pub fn less_than(
    cs: &ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
    width: usize,
) -> Result<Boolean<Fr>, SynthesisError> {
    let a_plus_one = a + Fr::from(1u64);
    less_or_equal(cs, &a_plus_one, b, width)
}

/// Quotient and remainder wires produced by [`div_rem()`].
pub struct Division {
    pub quotient: FpVar<Fr>,
    pub remainder: FpVar<Fr>,
}

/// Allocate `(dividend div divisor, dividend mod divisor)` and constrain
/// them with [`enforce_division()`].
///
/// `divisor` must be below `2^divisor_bits`; if it is a witness it is
/// range-checked here. Witness generation fails for a zero divisor or a
/// dividend wider than 64 bits.
pub fn div_rem(
    cs: &ConstraintSystemRef<Fr>,
    dividend: &FpVar<Fr>,
    divisor: &FpVar<Fr>,
    quotient_bits: usize,
    divisor_bits: usize,
) -> Result<Division, SynthesisError> {
    let clear = || -> Result<(u64, u64), SynthesisError> {
        let n = fr_to_u64(dividend.value()?).ok_or(SynthesisError::Unsatisfiable)?;
        let d = fr_to_u64(divisor.value()?).ok_or(SynthesisError::Unsatisfiable)?;
        div_rem_u64(n, d).ok_or(SynthesisError::Unsatisfiable)
    };
    let quotient = FpVar::new_witness(cs.clone(), || clear().map(|(q, _)| Fr::from(q)))?;
    let remainder = FpVar::new_witness(cs.clone(), || clear().map(|(_, r)| Fr::from(r)))?;
    enforce_division(
        cs,
        dividend,
        divisor,
        &quotient,
        &remainder,
        quotient_bits,
        divisor_bits,
    )?;
    Ok(Division {
        quotient,
        remainder,
    })
}

/// Constrain `dividend == quotient * divisor + remainder` with
/// `0 <= remainder < divisor`, `quotient < 2^quotient_bits`.
///
/// `quotient_bits + divisor_bits` must stay well below the field size so
/// the product cannot wrap.
pub fn enforce_division(
    cs: &ConstraintSystemRef<Fr>,
    dividend: &FpVar<Fr>,
    divisor: &FpVar<Fr>,
    quotient: &FpVar<Fr>,
    remainder: &FpVar<Fr>,
    quotient_bits: usize,
    divisor_bits: usize,
) -> Result<(), SynthesisError> {
    if !divisor.is_constant() {
        range_check(cs, divisor, divisor_bits)?;
    }
    range_check(cs, quotient, quotient_bits)?;
    range_check(cs, remainder, divisor_bits)?;

    let recomposed = quotient * divisor + remainder;
    recomposed.enforce_equal(dividend)?;

    less_than(cs, remainder, divisor, divisor_bits)?.enforce_equal(&Boolean::TRUE)
}

/// Integer division in the clear. `None` for a zero divisor.
pub fn div_rem_u64(dividend: u64, divisor: u64) -> Option<(u64, u64)> {
    Some((dividend.checked_div(divisor)?, dividend.checked_rem(divisor)?))
}

/// Whether `(quotient, remainder)` is the division of `dividend` by
/// `divisor`.
pub fn is_valid_division(dividend: u64, divisor: u64, quotient: u64, remainder: u64) -> bool {
    remainder < divisor
        && u128::from(quotient) * u128::from(divisor) + u128::from(remainder)
            == u128::from(dividend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::r1cs::ConstraintSystem;

    fn witness(cs: &ConstraintSystemRef<Fr>, v: u64) -> FpVar<Fr> {
        FpVar::new_witness(cs.clone(), || Ok(Fr::from(v))).unwrap()
    }

    fn le_holds(a: u64, b: u64, width: usize) -> (bool, bool) {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let av = witness(&cs, a);
        let bv = witness(&cs, b);
        range_check(&cs, &av, width).unwrap();
        range_check(&cs, &bv, width).unwrap();
        let out = less_or_equal(&cs, &av, &bv, width).unwrap();
        (out.value().unwrap(), cs.is_satisfied().unwrap())
    }

    #[test]
    fn range_check_accepts_in_range() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let x = witness(&cs, 31);
        let bits = range_check(&cs, &x, 5).unwrap();
        assert_eq!(bits.len(), 5);
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn range_check_rejects_overflow() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let x = witness(&cs, 32);
        range_check(&cs, &x, 5).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn less_or_equal_truth_table() {
        assert_eq!(le_holds(75, 100, 64), (true, true));
        assert_eq!(le_holds(100, 100, 64), (true, true));
        assert_eq!(le_holds(150, 100, 64), (false, true));
        assert_eq!(le_holds(0, u64::MAX, 64), (true, true));
        assert_eq!(le_holds(u64::MAX, 0, 64), (false, true));
        assert_eq!(le_holds(9, 14, 5), (true, true));
        assert_eq!(le_holds(19, 18, 5), (false, true));
    }

    #[test]
    fn less_than_is_strict() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let a = witness(&cs, 7);
        let b = witness(&cs, 7);
        assert!(!less_than(&cs, &a, &b, 8).unwrap().value().unwrap());
        let c = witness(&cs, 8);
        assert!(less_than(&cs, &a, &c, 8).unwrap().value().unwrap());
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn div_rem_computes_hour() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        // 2026-01-15T14:30:00Z
        let ts = witness(&cs, 1_768_487_400);
        let day = div_rem(&cs, &ts, &FpVar::constant(Fr::from(86_400u64)), 64, 17).unwrap();
        let hour = div_rem(&cs, &day.remainder, &FpVar::constant(Fr::from(3_600u64)), 5, 12).unwrap();
        assert_eq!(hour.quotient.value().unwrap(), Fr::from(14u64));
        assert_eq!(hour.remainder.value().unwrap(), Fr::from(1_800u64));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn div_rem_zero_divisor_fails_witness_generation() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let n = witness(&cs, 10);
        let zero = witness(&cs, 0);
        assert!(div_rem(&cs, &n, &zero, 8, 8).is_err());
    }

    #[test]
    fn clear_helpers() {
        assert_eq!(div_rem_u64(17, 5), Some((3, 2)));
        assert_eq!(div_rem_u64(17, 0), None);
        assert!(is_valid_division(17, 5, 3, 2));
        assert!(!is_valid_division(17, 5, 2, 7));
        assert!(!is_valid_division(17, 5, 3, 1));
        assert!(!is_valid_division(17, 0, 0, 17));
        assert!(is_valid_division(u64::MAX, 1, u64::MAX, 0));
    }

    fn supplied_division_satisfied(n: u64, d: u64, q: u64, r: u64) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let nv = witness(&cs, n);
        let dv = witness(&cs, d);
        let qv = witness(&cs, q);
        let rv = witness(&cs, r);
        enforce_division(&cs, &nv, &dv, &qv, &rv, 64, 32).unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn inconsistent_quotient_is_unsatisfiable() {
        assert!(supplied_division_satisfied(17, 5, 3, 2));
        // Equation holds, remainder too large.
        assert!(!supplied_division_satisfied(17, 5, 2, 7));
        // Remainder in range, equation fails.
        assert!(!supplied_division_satisfied(17, 5, 3, 1));
        // Zero divisor can never satisfy r < d.
        assert!(!supplied_division_satisfied(17, 0, 0, 17));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn division_constraints_match_arithmetic(
                n in any::<u64>(),
                d in 1u64..=u64::from(u32::MAX),
            ) {
                let (q, r) = div_rem_u64(n, d).unwrap();
                prop_assert!(is_valid_division(n, d, q, r));
                prop_assert!(supplied_division_satisfied(n, d, q, r));
            }

            #[test]
            fn off_by_one_quotient_rejected(
                n in 1u64..u64::MAX,
                d in 2u64..=u64::from(u32::MAX),
            ) {
                let (q, r) = div_rem_u64(n, d).unwrap();
                // Shift one divisor from the quotient into the remainder.
                if q > 0 {
                    prop_assert!(!is_valid_division(n, d, q - 1, r + d));
                    prop_assert!(!supplied_division_satisfied(n, d, q - 1, r + d));
                }
            }

            #[test]
            fn comparator_matches_ordering(a in any::<u64>(), b in any::<u64>()) {
                let (out, ok) = le_holds(a, b, 64);
                prop_assert!(ok);
                prop_assert_eq!(out, a <= b);
            }
        }
    }
}
