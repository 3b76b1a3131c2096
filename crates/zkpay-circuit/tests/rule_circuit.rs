//! Circuit behaviour driven from real rule sets and payment intents.

use zkpay_circuit::{CheckKind, CircuitInput, PublicOutputs, RuleValidationCircuit};
use zkpay_rules::{PaymentIntent, RuleSet};

/// 2026-01-15T14:00:00Z
const AT_14H: u64 = 1_768_485_600;
/// 2026-01-15T20:00:00Z
const AT_20H: u64 = 1_768_507_200;

fn rules() -> RuleSet {
    RuleSet::new(["0xD1", "0xD2"], 10, 9, 18).unwrap()
}

fn evaluate(dest: &str, amount: u64, ts: u64) -> (PublicOutputs, bool) {
    let intent = PaymentIntent::new(dest, amount).unwrap();
    let circuit = RuleValidationCircuit::new(CircuitInput::new(&intent, &rules(), ts));
    let out = circuit.outputs().unwrap();
    (out, circuit.check_satisfied().unwrap())
}

#[test]
fn whitelisted_payment_in_window_passes() {
    let (out, sat) = evaluate("0xD1", 6, AT_14H);
    assert!(sat);
    assert_eq!(out.bits(), [true; 4]);
}

#[test]
fn normalized_destination_matches_whitelist() {
    let (out, sat) = evaluate("  0xd2 ", 6, AT_14H);
    assert!(sat);
    assert!(out.destination);
}

#[test]
fn unknown_destination_fails_membership_only() {
    let (out, sat) = evaluate("0xD3", 6, AT_14H);
    assert!(sat);
    assert_eq!(out.bits(), [false, false, true, true]);
    assert_eq!(out.violations(), vec![CheckKind::Membership]);
}

#[test]
fn over_cap_fails_amount_regardless_of_others() {
    for (dest, ts) in [("0xD1", AT_14H), ("0xD3", AT_14H), ("0xD1", AT_20H), ("0xD3", AT_20H)] {
        let (out, sat) = evaluate(dest, 150, ts);
        assert!(sat);
        assert!(!out.overall);
        assert!(!out.amount);
    }
}

#[test]
fn outside_hours_fails_time() {
    let (out, sat) = evaluate("0xD1", 6, AT_20H);
    assert!(sat);
    assert_eq!(out.violations(), vec![CheckKind::TimeWindow]);
}

#[test]
fn single_destination_rule_set() {
    let rules = RuleSet::new(["only"], 5, 0, 23).unwrap();
    let hit = PaymentIntent::new("only", 5).unwrap();
    let miss = PaymentIntent::new("other", 5).unwrap();
    let c = RuleValidationCircuit::new(CircuitInput::new(&hit, &rules, AT_20H));
    assert!(c.outputs().unwrap().all_pass());
    assert!(c.check_satisfied().unwrap());
    let c = RuleValidationCircuit::new(CircuitInput::new(&miss, &rules, AT_20H));
    assert!(!c.outputs().unwrap().destination);
    assert!(c.check_satisfied().unwrap());
}
