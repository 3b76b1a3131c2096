//! # Digest Test Vectors
//!
//! Fixed SHA-256 vectors for the canonical pipeline. If one of these
//! changes, every stored rule commitment in a deployment becomes stale.

use zkpay_core::{sha256_digest, CanonicalBytes, Sha256Accumulator};

fn digest_hex(data: &impl serde::Serialize) -> String {
    let cb = CanonicalBytes::new(data).expect("canonicalization should succeed");
    sha256_digest(&cb).to_hex()
}

#[test]
fn empty_object() {
    assert_eq!(
        digest_hex(&serde_json::json!({})),
        "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
    );
}

#[test]
fn raw_empty_input() {
    assert_eq!(
        Sha256Accumulator::new().finalize().to_hex(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn raw_abc() {
    let mut acc = Sha256Accumulator::new();
    acc.update(b"abc");
    assert_eq!(
        acc.finalize().to_hex(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn key_order_does_not_change_digest() {
    let a: serde_json::Value =
        serde_json::from_str(r#"{"max_amount":500,"allowed_hours":[9,18]}"#).unwrap();
    let b: serde_json::Value =
        serde_json::from_str(r#"{ "allowed_hours" : [9, 18], "max_amount" : 500 }"#).unwrap();
    assert_eq!(digest_hex(&a), digest_hex(&b));
}

#[test]
fn canonical_digest_equals_raw_digest_of_canonical_bytes() {
    let value = serde_json::json!({"b": [1, 2, 3], "a": "x"});
    let cb = CanonicalBytes::new(&value).unwrap();
    let mut acc = Sha256Accumulator::new();
    acc.update(br#"{"a":"x","b":[1,2,3]}"#);
    assert_eq!(acc.finalize(), sha256_digest(&cb));
}
