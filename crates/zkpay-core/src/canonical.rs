//! # Canonical Serialization
//!
//! `CanonicalBytes` is the sole construction path for bytes that feed a
//! content digest over structured data (rule commitments, artifact
//! digests).
//!
//! ## Security Invariant
//!
//! The inner buffer is private. The only constructor serializes to a JSON
//! value, rejects non-integer numbers, and emits RFC 8785 (JCS) output:
//! sorted object keys, compact separators, deterministic number and string
//! encoding. Two structurally equal values always produce identical bytes,
//! which is what makes rule commitments order- and whitespace-independent.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructors are [`CanonicalBytes::new()`] and
///   [`CanonicalBytes::from_value()`].
/// - Numbers are integers; floats are rejected.
/// - Object keys are sorted, separators compact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integer number,
    /// `SerializationFailed` if serde or JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Canonicalize an already-built JSON value.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        let checked = reject_floats(value)?;
        let s = serde_jcs::to_string(&checked)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk the value tree and fail on the first non-integer number.
///
/// Amounts and caps are unsigned integers throughout zkpay; a float in a
/// committed structure means the caller built it wrong, and JCS number
/// formatting of floats is a classic source of cross-implementation drift.
fn reject_floats(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            if !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k, reject_floats(v)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(arr) => {
            let checked: Result<Vec<_>, _> = arr.into_iter().map(reject_floats).collect();
            Ok(Value::Array(checked?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_keys_compact_separators() {
        let data = serde_json::json!({"max_amount": 100, "allowed": ["b", "a"], "hours": {"start": 9, "end": 18}});
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(
            s,
            r#"{"allowed":["b","a"],"hours":{"end":18,"start":9},"max_amount":100}"#
        );
    }

    #[test]
    fn array_order_is_preserved() {
        // Canonicalization sorts keys, never array elements. Set semantics
        // are the caller's job (see RuleEncoder).
        let a = CanonicalBytes::new(&serde_json::json!(["x", "y"])).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!(["y", "x"])).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn float_rejected_anywhere() {
        let data = serde_json::json!({"a": {"b": [{"amount": 1.5}]}});
        match CanonicalBytes::new(&data).unwrap_err() {
            CanonicalizationError::FloatRejected(f) => assert_eq!(f, 1.5),
            other => panic!("expected FloatRejected, got: {other}"),
        }
    }

    #[test]
    fn large_unsigned_integer_accepted() {
        let data = serde_json::json!({"max_amount": u64::MAX});
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"max_amount":18446744073709551615}"#);
    }

    #[test]
    fn empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 2);
    }

    #[test]
    fn unicode_passes_through_as_utf8() {
        let cb = CanonicalBytes::new(&serde_json::json!({"name": "caf\u{00e9}"})).unwrap();
        assert!(std::str::from_utf8(cb.as_bytes()).unwrap().contains('\u{00e9}'));
    }
}
