//! Prover and verifier against real Groth16 keys.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use zkpay_circuit::PublicOutputs;
use zkpay_rules::{Destination, PaymentIntent, RuleCommitment, RuleEncoder, RuleSet};
use zkpay_zkp::{
    ArtifactStore, FixedClock, KeyedOracle, LocalStructuralVerifier, OnChainVerifier,
    OracleError, OracleSubmission, OracleVerdict, ProofArtifact, Prover, TrustTier,
    VerificationMode, VerificationOracle, Verifier,
};

/// 2026-01-15T14:00:00Z
const AT_14H: u64 = 1_768_485_600;

fn keys() -> &'static ArtifactStore {
    static KEYS: OnceLock<(tempfile::TempDir, ArtifactStore)> = OnceLock::new();
    &KEYS
        .get_or_init(|| {
            let dir = tempfile::tempdir().unwrap();
            let store = ArtifactStore::new(dir.path());
            store.setup(&mut StdRng::seed_from_u64(42)).unwrap();
            (dir, store)
        })
        .1
}

fn rules() -> RuleSet {
    RuleSet::new(["0xD1", "0xD2"], 10, 9, 18).unwrap()
}

fn prove(rules: &RuleSet, dest: &str, amount: u64) -> (ProofArtifact, RuleCommitment) {
    let c = RuleEncoder::commit(rules).unwrap();
    let prover = Prover::new(keys().clone())
        .with_clock(Arc::new(FixedClock::at_epoch_secs(AT_14H).unwrap()));
    let artifact = prover
        .prove_strict(&PaymentIntent::new(dest, amount).unwrap(), rules, &c)
        .unwrap();
    (artifact, c)
}

fn keyed_oracle(rules: &RuleSet) -> Arc<KeyedOracle> {
    let oracle = KeyedOracle::from_store(keys()).unwrap();
    oracle.register(rules).unwrap();
    Arc::new(oracle)
}

fn dest(s: &str) -> Destination {
    Destination::parse(s).unwrap()
}

struct FailingOracle(OracleError);

#[async_trait]
impl VerificationOracle for FailingOracle {
    fn name(&self) -> &str {
        "failing"
    }

    async fn submit(&self, _: &OracleSubmission) -> Result<OracleVerdict, OracleError> {
        Err(self.0.clone())
    }
}

struct HangingOracle;

#[async_trait]
impl VerificationOracle for HangingOracle {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn submit(&self, _: &OracleSubmission) -> Result<OracleVerdict, OracleError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(OracleVerdict {
            verified: true,
            receipt: None,
        })
    }
}

#[tokio::test]
async fn compliant_payment_is_authorized_on_chain() {
    let rules = rules();
    let (artifact, c) = prove(&rules, "0xD1", 6);
    assert_eq!(artifact.trust_tier(), TrustTier::Proved);

    let verifier = Verifier::new(
        Some(OnChainVerifier::new(keyed_oracle(&rules))),
        LocalStructuralVerifier::new(),
    );
    let result = verifier.verify(&artifact, &c, &dest("0xD1"), 6).await;
    assert!(result.authorized);
    assert_eq!(result.mode, VerificationMode::OnChain);
    assert!(result.receipt.unwrap().starts_with("keyed:"));
    assert!(result.fallback_reason.is_none());
}

#[tokio::test]
async fn non_whitelisted_payment_is_not_authorized() {
    let rules = rules();
    let (artifact, c) = prove(&rules, "0xD3", 6);
    assert_eq!(artifact.public_outputs.bits(), [false, false, true, true]);

    let verifier = Verifier::new(
        Some(OnChainVerifier::new(keyed_oracle(&rules))),
        LocalStructuralVerifier::new(),
    );
    let result = verifier.verify(&artifact, &c, &dest("0xD3"), 6).await;
    // The proof itself is valid; it proves a failing payment.
    assert_eq!(result.mode, VerificationMode::OnChain);
    assert!(!result.authorized);
}

#[tokio::test]
async fn forged_output_bits_fail_the_pairing_check() {
    let rules = rules();
    let (mut artifact, c) = prove(&rules, "0xD3", 6);
    artifact.public_outputs = PublicOutputs::from_checks(true, true, true);

    let oracle = keyed_oracle(&rules);
    let submission = OracleSubmission::from_artifact(&artifact, "0xd3", 6).unwrap();
    assert!(!oracle.submit(&submission).await.unwrap().verified);

    let verifier = Verifier::new(Some(OnChainVerifier::new(oracle)), LocalStructuralVerifier::new());
    let result = verifier.verify(&artifact, &c, &dest("0xD3"), 6).await;
    assert!(!result.authorized);
}

#[tokio::test]
async fn unregistered_rules_revert() {
    let rules = rules();
    let (artifact, _) = prove(&rules, "0xD1", 6);
    let oracle = KeyedOracle::from_store(keys()).unwrap();
    let submission = OracleSubmission::from_artifact(&artifact, "0xd1", 6).unwrap();
    assert!(matches!(
        oracle.submit(&submission).await,
        Err(OracleError::Reverted(_))
    ));
}

#[tokio::test]
async fn oracle_timeout_falls_back_to_local_checks() {
    let rules = rules();
    let (artifact, c) = prove(&rules, "0xD1", 6);
    let verifier = Verifier::new(
        Some(OnChainVerifier::new(Arc::new(HangingOracle)).with_timeout(Duration::from_millis(50))),
        LocalStructuralVerifier::new(),
    );
    let result = verifier.verify(&artifact, &c, &dest("0xD1"), 6).await;
    assert!(result.authorized);
    assert_eq!(result.mode, VerificationMode::LocalFallback);
    assert!(result.fallback_reason.unwrap().contains("did not answer"));
}

#[tokio::test]
async fn every_oracle_failure_downgrades() {
    let rules = rules();
    let (artifact, c) = prove(&rules, "0xD1", 6);
    for failure in [
        OracleError::Unreachable("connection refused".into()),
        OracleError::Reverted("execution reverted".into()),
        OracleError::InvalidResponse("missing result field".into()),
    ] {
        let verifier = Verifier::new(
            Some(OnChainVerifier::new(Arc::new(FailingOracle(failure.clone())))),
            LocalStructuralVerifier::new(),
        );
        let result = verifier.verify(&artifact, &c, &dest("0xD1"), 6).await;
        assert_eq!(result.mode, VerificationMode::LocalFallback);
        assert!(result.authorized);
        assert_eq!(result.fallback_reason, Some(failure.to_string()));
    }
}

#[tokio::test]
async fn local_checks_reject_mangled_proofs() {
    let rules = rules();
    let (mut artifact, c) = prove(&rules, "0xD1", 6);
    if let zkpay_zkp::ProofPayload::Groth16 { proof_hex, .. } = &mut artifact.proof {
        proof_hex.truncate(64);
    }
    let result = Verifier::local_only(LocalStructuralVerifier::new())
        .verify(&artifact, &c, &dest("0xD1"), 6)
        .await;
    assert!(!result.authorized);
    assert_eq!(
        result.fallback_reason.as_deref(),
        Some("no verification oracle configured")
    );
}

#[tokio::test]
async fn local_checks_reject_outputs_that_disagree_with_inputs() {
    let rules = rules();
    let (mut artifact, c) = prove(&rules, "0xD3", 6);
    artifact.public_outputs = PublicOutputs::from_checks(true, true, true);
    let result = Verifier::local_only(LocalStructuralVerifier::new())
        .verify(&artifact, &c, &dest("0xD3"), 6)
        .await;
    assert!(!result.authorized);
}
