//! # Content Digests
//!
//! `ContentDigest` is a 32-byte SHA-256 value tagged with its algorithm.
//! Rule commitments, key digests in the artifact manifest, and the
//! destination-to-field mapping are all built on it.
//!
//! ## Security Invariant
//!
//! Digests over structured data are only computed from `CanonicalBytes`
//! ([`sha256_digest()`]). Raw byte streams that are not JSON (proving keys,
//! domain-separated identifier preimages) go through [`Sha256Accumulator`],
//! which makes the framing explicit at the call site.
//!
//! Equality of two digests uses a constant-time comparison so that
//! commitment checks do not leak a matching prefix length.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content digest with its algorithm tag.
#[derive(Debug, Clone, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a new content digest from raw bytes and algorithm.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a SHA-256 digest from 64 hex characters, with or without a
    /// leading `sha256:` tag.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let hex = s.strip_prefix("sha256:").unwrap_or(s);
        if hex.len() != 64 {
            return Err(CoreError::InvalidDigest(format!(
                "expected 64 hex characters, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| CoreError::InvalidDigest("non-ascii input".into()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| CoreError::InvalidDigest(format!("bad hex pair {pair:?}")))?;
        }
        Ok(Self::new(DigestAlgorithm::Sha256, bytes))
    }
}

impl PartialEq for ContentDigest {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && bool::from(self.bytes.ct_eq(&other.bytes))
    }
}

impl Eq for ContentDigest {}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// Accepts only `&CanonicalBytes`, so a digest over structured data can
/// never be taken from a non-canonical serialization.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let mut acc = Sha256Accumulator::new();
    acc.update(data.as_bytes());
    acc.finalize()
}

/// Hex form of [`sha256_digest()`].
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// Incremental SHA-256 over raw bytes.
///
/// Used where the preimage is not a JSON document: serialized proving and
/// verifying keys, and domain-separated identifier hashing.
#[derive(Clone, Default)]
pub struct Sha256Accumulator {
    hasher: Sha256,
}

impl Sha256Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the running hash.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update(data);
        self
    }

    /// Consume the accumulator and return the tagged digest.
    pub fn finalize(self) -> ContentDigest {
        let hash = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        ContentDigest::new(DigestAlgorithm::Sha256, bytes)
    }
}

impl std::fmt::Debug for Sha256Accumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256Accumulator").finish_non_exhaustive()
    }
}
