//! # Field Mapping
//!
//! Conversions between zkpay values and BN254 scalar field elements.
//!
//! ## Security Invariant
//!
//! A destination maps to the first 31 bytes (248 bits) of
//! `SHA-256("zkpay.destination.v1" || 0x00 || normalized identifier)`,
//! read big-endian. 2^248 is far below the BN254 scalar modulus, so the
//! mapping never reduces and two identifiers collide only if their
//! truncated digests do. Unused whitelist slots hold [`padding_slot()`],
//! which is exactly 2^248 and therefore unreachable from any identifier.

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, PrimeField};
use zkpay_core::Sha256Accumulator;
use zkpay_rules::Destination;

use crate::error::CircuitError;

/// Domain separator for the destination digest.
pub const DESTINATION_DOMAIN: &[u8] = b"zkpay.destination.v1";

/// Width of a mapped destination.
pub const DESTINATION_BITS: usize = 248;

const DESTINATION_BYTES: usize = DESTINATION_BITS / 8;

/// Map a normalized destination to its field element.
pub fn destination_to_field(destination: &Destination) -> Fr {
    let mut acc = Sha256Accumulator::new();
    acc.update(DESTINATION_DOMAIN)
        .update(&[0u8])
        .update(destination.as_str().as_bytes());
    let digest = acc.finalize();
    Fr::from_be_bytes_mod_order(&digest.bytes[..DESTINATION_BYTES])
}

/// Filler for unused whitelist slots: 2^248.
pub fn padding_slot() -> Fr {
    Fr::from(2u64).pow([DESTINATION_BITS as u64])
}

/// The value as a `u64`, if it fits.
pub fn fr_to_u64(x: Fr) -> Option<u64> {
    let limbs = x.into_bigint().0;
    if limbs[1..].iter().all(|l| *l == 0) {
        Some(limbs[0])
    } else {
        None
    }
}

/// True if `x < 2^bits`.
pub fn fits_in_bits(x: Fr, bits: usize) -> bool {
    let repr = x.into_bigint();
    (bits..Fr::MODULUS_BIT_SIZE as usize).all(|i| !repr.get_bit(i))
}

/// Big-endian, 64 hex characters.
pub fn fr_to_hex(x: &Fr) -> String {
    x.into_bigint()
        .to_bytes_be()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Inverse of [`fr_to_hex()`]. Rejects values at or above the modulus.
pub fn fr_from_hex(s: &str) -> Result<Fr, CircuitError> {
    if s.len() != 64 {
        return Err(CircuitError::InvalidFieldEncoding(format!(
            "expected 64 hex characters, got {}",
            s.len()
        )));
    }
    let mut bytes = Vec::with_capacity(32);
    for i in (0..64).step_by(2) {
        let pair = s
            .get(i..i + 2)
            .ok_or_else(|| CircuitError::InvalidFieldEncoding("non-ascii input".into()))?;
        let byte = u8::from_str_radix(pair, 16)
            .map_err(|_| CircuitError::InvalidFieldEncoding(format!("bad hex pair {pair:?}")))?;
        bytes.push(byte);
    }
    let x = Fr::from_be_bytes_mod_order(&bytes);
    if x.into_bigint().to_bytes_be() != bytes {
        return Err(CircuitError::InvalidFieldEncoding(
            "value is not below the field modulus".into(),
        ));
    }
    Ok(x)
}
