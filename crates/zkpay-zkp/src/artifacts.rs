//! # Key Artifact Store
//!
//! Filesystem layout for the Groth16 keys of the rule validation circuit:
//!
//! ```text
//! <dir>/rule_validation.pk   compressed proving key
//! <dir>/rule_validation.vk   compressed verifying key
//! <dir>/manifest.json        circuit id, curve, shape, key digests
//! ```
//!
//! ## Security Invariant
//!
//! A key is only handed out after its SHA-256 digest matches the manifest
//! and the manifest matches the circuit compiled into this binary (id,
//! curve, constraint and public-input counts). Keys generated for another
//! circuit layout are reported as unavailable, never used.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkpay_circuit::{CircuitShape, RuleValidationCircuit, CIRCUIT_ID};
use zkpay_core::{ContentDigest, Sha256Accumulator, Timestamp};

use crate::groth16::{
    key_to_bytes, proving_key_from_bytes, verifying_key_from_bytes, Groth16ProofSystem,
    RuleProvingKey, RuleVerifyingKey, CURVE,
};

pub const PROVING_KEY_FILE: &str = "rule_validation.pk";
pub const VERIFYING_KEY_FILE: &str = "rule_validation.vk";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Proving or verifying material could not be obtained.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("artifact {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("keys were generated for {found}, this binary expects {expected}")]
    CircuitMismatch { expected: String, found: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("trusted setup failed: {0}")]
    Setup(String),
}

/// Describes a key pair on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyManifest {
    pub circuit_id: String,
    pub curve: String,
    pub shape: CircuitShape,
    /// `sha256:<hex>` of `rule_validation.pk`.
    pub proving_key_digest: String,
    /// `sha256:<hex>` of `rule_validation.vk`.
    pub verifying_key_digest: String,
    pub created_at: Timestamp,
}

impl KeyManifest {
    /// Compare against the circuit compiled into this binary.
    pub fn ensure_compatible(&self, shape: &CircuitShape) -> Result<(), ArtifactError> {
        let expected = describe(CIRCUIT_ID, CURVE, shape);
        let found = describe(&self.circuit_id, &self.curve, &self.shape);
        if expected != found {
            return Err(ArtifactError::CircuitMismatch { expected, found });
        }
        Ok(())
    }
}

fn describe(circuit_id: &str, curve: &str, shape: &CircuitShape) -> String {
    format!(
        "{circuit_id} on {curve} ({} constraints, {} public inputs)",
        shape.num_constraints, shape.num_public_inputs
    )
}

/// Directory holding one key pair and its manifest.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn proving_key_path(&self) -> PathBuf {
        self.dir.join(PROVING_KEY_FILE)
    }

    pub fn verifying_key_path(&self) -> PathBuf {
        self.dir.join(VERIFYING_KEY_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// Run the circuit-specific setup and write both keys and the
    /// manifest. The manifest is written last; a directory without one is
    /// treated as incomplete.
    pub fn setup<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<KeyManifest, ArtifactError> {
        let shape =
            RuleValidationCircuit::shape().map_err(|e| ArtifactError::Setup(e.to_string()))?;
        let (pk, vk) = Groth16ProofSystem
            .setup(rng)
            .map_err(|e| ArtifactError::Setup(e.to_string()))?;
        let pk_bytes = key_to_bytes(&pk).map_err(|e| ArtifactError::Setup(e.to_string()))?;
        let vk_bytes = key_to_bytes(&vk).map_err(|e| ArtifactError::Setup(e.to_string()))?;

        let manifest = KeyManifest {
            circuit_id: CIRCUIT_ID.to_string(),
            curve: CURVE.to_string(),
            shape,
            proving_key_digest: file_digest(&pk_bytes).to_string(),
            verifying_key_digest: file_digest(&vk_bytes).to_string(),
            created_at: Timestamp::now(),
        };
        let manifest_bytes = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| ArtifactError::Setup(e.to_string()))?;

        fs::create_dir_all(&self.dir).map_err(|source| ArtifactError::Io {
            path: self.dir.clone(),
            source,
        })?;
        write_file(&self.proving_key_path(), &pk_bytes)?;
        write_file(&self.verifying_key_path(), &vk_bytes)?;
        write_file(&self.manifest_path(), &manifest_bytes)?;

        tracing::info!(
            dir = %self.dir.display(),
            constraints = manifest.shape.num_constraints,
            "wrote rule validation keys"
        );
        Ok(manifest)
    }

    /// Read the manifest and check it against the compiled circuit.
    pub fn manifest(&self) -> Result<KeyManifest, ArtifactError> {
        let path = self.manifest_path();
        let bytes = read_file(&path)?;
        let manifest: KeyManifest =
            serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        let shape = RuleValidationCircuit::shape().map_err(|e| ArtifactError::Corrupt {
            path,
            reason: e.to_string(),
        })?;
        manifest.ensure_compatible(&shape)?;
        Ok(manifest)
    }

    pub fn load_proving_key(&self) -> Result<RuleProvingKey, ArtifactError> {
        let manifest = self.manifest()?;
        let path = self.proving_key_path();
        let bytes = read_checked(&path, &manifest.proving_key_digest)?;
        proving_key_from_bytes(&bytes).map_err(|e| ArtifactError::Corrupt {
            path,
            reason: e.to_string(),
        })
    }

    pub fn load_verifying_key(&self) -> Result<RuleVerifyingKey, ArtifactError> {
        let manifest = self.manifest()?;
        let path = self.verifying_key_path();
        let bytes = read_checked(&path, &manifest.verifying_key_digest)?;
        verifying_key_from_bytes(&bytes).map_err(|e| ArtifactError::Corrupt {
            path,
            reason: e.to_string(),
        })
    }
}

fn file_digest(bytes: &[u8]) -> ContentDigest {
    let mut acc = Sha256Accumulator::new();
    acc.update(bytes);
    acc.finalize()
}

fn read_checked(path: &Path, expected: &str) -> Result<Vec<u8>, ArtifactError> {
    let bytes = read_file(path)?;
    let expected = ContentDigest::from_hex(expected).map_err(|e| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        reason: format!("manifest digest: {e}"),
    })?;
    let actual = file_digest(&bytes);
    if actual != expected {
        return Err(ArtifactError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("digest {actual} does not match manifest {expected}"),
        });
    }
    Ok(bytes)
}

fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ArtifactError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    fs::write(path, bytes).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}
