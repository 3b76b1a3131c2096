//! # Temporal Types — UTC-Only Timestamps
//!
//! `Timestamp` is UTC, truncated to whole seconds. The prover samples one
//! when it builds a proof, and the circuit derives the execution hour from
//! its epoch seconds, so the hour the rules see and the hour recorded in
//! the authorization record always agree.
//!
//! ## Security Invariant
//!
//! Non-UTC inputs are rejected by [`Timestamp::parse()`]. Local offsets
//! would produce different canonical bytes for the same instant and a
//! different hour-of-day for the same proof.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Seconds in one UTC day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in one hour.
pub const SECONDS_PER_HOUR: u64 = 3_600;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string with a `Z` suffix.
    ///
    /// # Errors
    ///
    /// Rejects strings that are not RFC 3339 or that carry any explicit
    /// offset, including `+00:00`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// From Unix epoch seconds. Negative values (before 1970) are
    /// rejected; the circuit works on unsigned seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        if secs < 0 {
            return Err(CoreError::InvalidTimestamp(format!(
                "pre-epoch timestamp not supported: {secs}"
            )));
        }
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| CoreError::InvalidTimestamp(format!("out of range: {secs}")))?;
        Ok(Self(dt))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Unix epoch seconds as an unsigned value, clamped at zero.
    pub fn unsigned_epoch_secs(&self) -> u64 {
        u64::try_from(self.0.timestamp()).unwrap_or(0)
    }

    /// UTC hour of day in `0..=23`, computed the same way the circuit
    /// computes it: `(secs mod 86400) div 3600`.
    pub fn hour_of_day(&self) -> u8 {
        ((self.unsigned_epoch_secs() % SECONDS_PER_DAY) / SECONDS_PER_HOUR) as u8
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn parse_offsets_rejected() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T17:00:00+05:00").is_err());
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn epoch_roundtrip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let ts2 = Timestamp::from_epoch_secs(ts.epoch_secs()).unwrap();
        assert_eq!(ts, ts2);
    }

    #[test]
    fn negative_epoch_rejected() {
        assert!(Timestamp::from_epoch_secs(-1).is_err());
    }

    #[test]
    fn hour_of_day_matches_chrono() {
        for (h, m) in [(0, 0), (9, 15), (12, 0), (18, 59), (23, 59)] {
            let dt = Utc.with_ymd_and_hms(2026, 3, 7, h, m, 30).unwrap();
            let ts = Timestamp::from_utc(dt);
            assert_eq!(u32::from(ts.hour_of_day()), dt.hour());
        }
    }

    #[test]
    fn hour_boundaries() {
        // 2026-01-15T00:00:00Z
        let midnight = Timestamp::parse("2026-01-15T00:00:00Z").unwrap();
        assert_eq!(midnight.hour_of_day(), 0);
        let last = Timestamp::from_epoch_secs(midnight.epoch_secs() - 1).unwrap();
        assert_eq!(last.hour_of_day(), 23);
    }
}
