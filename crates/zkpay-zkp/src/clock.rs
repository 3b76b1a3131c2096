//! Time source for proof generation. The execution hour is never supplied
//! by the caller; the prover samples a [`Clock`].

use zkpay_core::{CoreError, Timestamp};

pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> Timestamp;
}

/// Wall-clock UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Always returns the same instant. Used for replay and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(Timestamp);

impl FixedClock {
    pub fn new(at: Timestamp) -> Self {
        Self(at)
    }

    pub fn at_epoch_secs(secs: u64) -> Result<Self, CoreError> {
        let secs = i64::try_from(secs)
            .map_err(|_| CoreError::InvalidTimestamp(format!("{secs} is out of range")))?;
        Ok(Self(Timestamp::from_epoch_secs(secs)?))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
