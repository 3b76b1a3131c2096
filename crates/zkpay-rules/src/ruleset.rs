//! # Rule Sets
//!
//! A `RuleSet` is the user's payment policy: at most three allowed
//! destinations, a maximum amount, and an inclusive UTC hour window.
//!
//! ## Invariants
//!
//! - Fields are private; every `RuleSet` in memory passed [`RuleSet::new()`].
//!   Deserialization routes through the same constructor (`serde(try_from)`).
//! - Destinations are stored sorted ascending and free of duplicates, so
//!   the circuit's whitelist slots are a pure function of the rule content.
//! - `0 <= start <= end <= 23`. Windows that wrap midnight are not
//!   expressible; split them into two rule sets.

use serde::{Deserialize, Serialize};

use crate::destination::Destination;
use crate::error::RuleEncodingError;

/// Whitelist capacity. Fixed by the circuit's public-input layout.
pub const MAX_DESTINATIONS: usize = 3;

/// Largest valid hour of day.
pub const MAX_HOUR: u8 = 23;

/// Inclusive UTC hour range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u8,
    pub end: u8,
}

impl HourWindow {
    pub fn new(start: u8, end: u8) -> Result<Self, RuleEncodingError> {
        for h in [start, end] {
            if h > MAX_HOUR {
                return Err(RuleEncodingError::HourOutOfRange(h));
            }
        }
        if start > end {
            return Err(RuleEncodingError::InvertedHourWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, hour: u8) -> bool {
        self.start <= hour && hour <= self.end
    }
}

/// A validated, immutable payment rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleSetDocument")]
pub struct RuleSet {
    allowed_destinations: Vec<Destination>,
    max_amount: u64,
    allowed_hours: HourWindow,
}

/// Unvalidated wire form of a rule set, as read from YAML or JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSetDocument {
    allowed_destinations: Vec<String>,
    max_amount: u64,
    allowed_hours: HourWindow,
}

impl TryFrom<RuleSetDocument> for RuleSet {
    type Error = RuleEncodingError;

    fn try_from(doc: RuleSetDocument) -> Result<Self, Self::Error> {
        RuleSet::new(
            doc.allowed_destinations,
            doc.max_amount,
            doc.allowed_hours.start,
            doc.allowed_hours.end,
        )
    }
}

impl RuleSet {
    /// Validate and normalize a rule set.
    ///
    /// # Errors
    ///
    /// Empty whitelist, more than [`MAX_DESTINATIONS`] entries, an empty
    /// or oversized identifier, a duplicate after normalization, an hour
    /// above 23, or `start > end`.
    pub fn new<I, S>(
        allowed_destinations: I,
        max_amount: u64,
        start_hour: u8,
        end_hour: u8,
    ) -> Result<Self, RuleEncodingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut destinations = Vec::new();
        for (index, raw) in allowed_destinations.into_iter().enumerate() {
            let d = Destination::parse(raw)
                .map_err(|source| RuleEncodingError::InvalidDestination { index, source })?;
            destinations.push(d);
        }

        if destinations.is_empty() {
            return Err(RuleEncodingError::NoDestinations);
        }
        if destinations.len() > MAX_DESTINATIONS {
            return Err(RuleEncodingError::TooManyDestinations {
                count: destinations.len(),
                max: MAX_DESTINATIONS,
            });
        }

        destinations.sort();
        if let Some(pair) = destinations.windows(2).find(|w| w[0] == w[1]) {
            return Err(RuleEncodingError::DuplicateDestination(
                pair[0].as_str().to_string(),
            ));
        }

        Ok(Self {
            allowed_destinations: destinations,
            max_amount,
            allowed_hours: HourWindow::new(start_hour, end_hour)?,
        })
    }

    /// Allowed destinations, sorted ascending.
    pub fn allowed_destinations(&self) -> &[Destination] {
        &self.allowed_destinations
    }

    pub fn max_amount(&self) -> u64 {
        self.max_amount
    }

    pub fn allowed_hours(&self) -> HourWindow {
        self.allowed_hours
    }

    pub fn allows_destination(&self, destination: &Destination) -> bool {
        self.allowed_destinations.contains(destination)
    }

    pub fn allows_amount(&self, amount: u64) -> bool {
        amount <= self.max_amount
    }

    pub fn allows_hour(&self, hour: u8) -> bool {
        self.allowed_hours.contains(hour)
    }
}
