//! # Groth16 over BN254
//!
//! `ark-groth16` behind the [`ProofSystem`] trait, specialised to the
//! rule validation circuit.
//!
//! ## Properties
//!
//! - **Proof size:** 128 bytes compressed (two G1 points, one G2 point).
//! - **Verification:** constant time, three pairings.
//! - **Trusted setup:** circuit-specific; see `ArtifactStore::setup()`.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zkpay_circuit::{RuleValidationCircuit, NUM_PUBLIC_INPUTS};

use crate::traits::{ProofError, ProofSystem, VerifyError};

/// Curve tag recorded in artifacts and manifests.
pub const CURVE: &str = "bn254";

/// Compressed proof length in bytes.
pub const PROOF_SIZE: usize = 128;

pub type RuleProvingKey = ProvingKey<Bn254>;
pub type RuleVerifyingKey = VerifyingKey<Bn254>;

/// A Groth16 proof for the rule validation circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct Groth16Proof(Proof<Bn254>);

impl Groth16Proof {
    /// Compressed canonical encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProofError> {
        let mut out = Vec::with_capacity(PROOF_SIZE);
        self.0
            .serialize_compressed(&mut out)
            .map_err(|e| ProofError::Serialization(e.to_string()))?;
        Ok(out)
    }

    /// Decode and validate (points on curve, in the prime-order subgroup).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerifyError> {
        if bytes.len() != PROOF_SIZE {
            return Err(VerifyError::InvalidProof(format!(
                "expected {PROOF_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        Proof::<Bn254>::deserialize_compressed(bytes)
            .map(Self)
            .map_err(|e| VerifyError::InvalidProof(e.to_string()))
    }

    pub fn to_hex(&self) -> Result<String, ProofError> {
        Ok(encode_hex(&self.to_bytes()?))
    }

    pub fn from_hex(s: &str) -> Result<Self, VerifyError> {
        let bytes = decode_hex(s).map_err(VerifyError::InvalidProof)?;
        Self::from_bytes(&bytes)
    }
}

/// The Groth16 backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Groth16ProofSystem;

impl Groth16ProofSystem {
    /// Circuit-specific trusted setup for the rule validation circuit.
    pub fn setup<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(RuleProvingKey, RuleVerifyingKey), ProofError> {
        Groth16::<Bn254>::circuit_specific_setup(RuleValidationCircuit::blank(), rng)
            .map_err(|e| ProofError::Prover(e.to_string()))
    }
}

impl ProofSystem for Groth16ProofSystem {
    type Proof = Groth16Proof;
    type VerifyingKey = RuleVerifyingKey;
    type ProvingKey = RuleProvingKey;
    type Circuit = RuleValidationCircuit;
    type PublicInput = Fr;

    fn prove(
        &self,
        pk: &Self::ProvingKey,
        circuit: Self::Circuit,
    ) -> Result<Self::Proof, ProofError> {
        Groth16::<Bn254>::prove(pk, circuit, &mut OsRng)
            .map(Groth16Proof)
            .map_err(|e| ProofError::Prover(e.to_string()))
    }

    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_inputs: &[Fr],
    ) -> Result<bool, VerifyError> {
        if public_inputs.len() != NUM_PUBLIC_INPUTS || vk.gamma_abc_g1.len() != NUM_PUBLIC_INPUTS + 1
        {
            return Err(VerifyError::KeyMismatch(format!(
                "verifying key expects {} public inputs, got {}",
                vk.gamma_abc_g1.len().saturating_sub(1),
                public_inputs.len()
            )));
        }
        Groth16::<Bn254>::verify(vk, public_inputs, &proof.0)
            .map_err(|e| VerifyError::InvalidProof(e.to_string()))
    }
}

/// Serialize a key to compressed canonical bytes.
pub fn key_to_bytes<K: CanonicalSerialize>(key: &K) -> Result<Vec<u8>, ProofError> {
    let mut out = Vec::with_capacity(key.compressed_size());
    key.serialize_compressed(&mut out)
        .map_err(|e| ProofError::Serialization(e.to_string()))?;
    Ok(out)
}

/// Decode a verifying key with full point validation.
pub fn verifying_key_from_bytes(bytes: &[u8]) -> Result<RuleVerifyingKey, ProofError> {
    RuleVerifyingKey::deserialize_compressed(bytes)
        .map_err(|e| ProofError::Serialization(e.to_string()))
}

/// Decode a proving key. Point validation is skipped; callers check the
/// key digest against the manifest first.
pub fn proving_key_from_bytes(bytes: &[u8]) -> Result<RuleProvingKey, ProofError> {
    RuleProvingKey::deserialize_compressed_unchecked(bytes)
        .map_err(|e| ProofError::Serialization(e.to_string()))
}

pub(crate) fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.len() % 2 != 0 {
        return Err(format!("odd-length hex string ({} chars)", s.len()));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex at offset {i}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use zkpay_circuit::CircuitInput;
    use zkpay_rules::{PaymentIntent, RuleSet};

    /// 2026-01-15T14:00:00Z
    const AT_14H: u64 = 1_768_485_600;

    fn keys() -> (RuleProvingKey, RuleVerifyingKey) {
        let mut rng = StdRng::seed_from_u64(7);
        Groth16ProofSystem.setup(&mut rng).unwrap()
    }

    fn circuit(dest: &str, amount: u64) -> RuleValidationCircuit {
        let rules = RuleSet::new(["0xD1", "0xD2"], 10, 9, 18).unwrap();
        let intent = PaymentIntent::new(dest, amount).unwrap();
        RuleValidationCircuit::new(CircuitInput::new(&intent, &rules, AT_14H))
    }

    #[test]
    fn prove_and_verify() {
        let (pk, vk) = keys();
        let sys = Groth16ProofSystem;

        let c = circuit("0xD1", 6);
        let inputs = c.public_inputs().unwrap();
        let proof = sys.prove(&pk, c).unwrap();
        assert!(sys.verify(&vk, &proof, &inputs).unwrap());

        // Flipping the overall bit breaks verification.
        let mut tampered = inputs.clone();
        tampered[0] = Fr::from(0u64);
        assert!(!sys.verify(&vk, &proof, &tampered).unwrap());

        // Encoding is 128 bytes and decodes to the same proof.
        let bytes = proof.to_bytes().unwrap();
        assert_eq!(bytes.len(), PROOF_SIZE);
        let back = Groth16Proof::from_hex(&proof.to_hex().unwrap()).unwrap();
        assert_eq!(back, proof);
    }

    #[test]
    fn failing_payment_still_proves_its_outputs() {
        let (pk, vk) = keys();
        let sys = Groth16ProofSystem;
        let c = circuit("0xD3", 6);
        assert!(!c.outputs().unwrap().overall);
        let inputs = c.public_inputs().unwrap();
        let proof = sys.prove(&pk, c).unwrap();
        assert!(sys.verify(&vk, &proof, &inputs).unwrap());
    }

    #[test]
    fn wrong_input_count_is_key_mismatch() {
        let (pk, vk) = keys();
        let sys = Groth16ProofSystem;
        let proof = sys.prove(&pk, circuit("0xD1", 6)).unwrap();
        assert!(matches!(
            sys.verify(&vk, &proof, &[Fr::from(1u64)]),
            Err(VerifyError::KeyMismatch(_))
        ));
    }

    #[test]
    fn malformed_proof_bytes_rejected() {
        assert!(Groth16Proof::from_bytes(&[0u8; 10]).is_err());
        assert!(Groth16Proof::from_bytes(&[0xffu8; PROOF_SIZE]).is_err());
        assert!(Groth16Proof::from_hex("zz").is_err());
    }

    #[test]
    fn verifying_key_bytes_roundtrip() {
        let (_, vk) = keys();
        let bytes = key_to_bytes(&vk).unwrap();
        assert_eq!(verifying_key_from_bytes(&bytes).unwrap(), vk);
    }

    #[test]
    fn hex_helpers() {
        assert_eq!(encode_hex(&[0, 1, 0xab]), "0001ab");
        assert_eq!(decode_hex("0x0001ab").unwrap(), vec![0, 1, 0xab]);
        assert!(decode_hex("abc").is_err());
    }
}
