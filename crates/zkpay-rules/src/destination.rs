//! # Payment Destinations
//!
//! A `Destination` is a normalized identifier string. Normalization trims
//! surrounding whitespace and lowercases `0x`-prefixed hex addresses, so
//! `0xABcd` and ` 0xabcd ` are the same whitelist entry and hash to the
//! same field element.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest identifier accepted, in bytes after normalization.
pub const MAX_DESTINATION_LEN: usize = 256;

/// Shape errors for a destination identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DestinationError {
    #[error("destination identifier is empty")]
    Empty,

    #[error("destination identifier is {len} bytes; maximum is {MAX_DESTINATION_LEN}")]
    TooLong { len: usize },
}

/// A normalized payment destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Destination(String);

impl Destination {
    /// Normalize and validate an identifier.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, DestinationError> {
        let normalized = normalize(raw.as_ref());
        if normalized.is_empty() {
            return Err(DestinationError::Empty);
        }
        if normalized.len() > MAX_DESTINATION_LEN {
            return Err(DestinationError::TooLong {
                len: normalized.len(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Destination {
    type Error = DestinationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Destination> for String {
    fn from(d: Destination) -> Self {
        d.0
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let is_hex_address = trimmed.len() > 2
        && (trimmed.starts_with("0x") || trimmed.starts_with("0X"))
        && trimmed[2..].chars().all(|c| c.is_ascii_hexdigit());
    if is_hex_address {
        trimmed.to_ascii_lowercase()
    } else {
        trimmed.to_string()
    }
}
