//! # Payment Intents
//!
//! The private facts a proof is generated over. The caller supplies the
//! destination and amount; the execution hour is sampled by the prover
//! from its clock so it cannot be back-dated.

use serde::{Deserialize, Serialize};

use crate::destination::Destination;
use crate::error::IntentError;

/// A shape-checked payment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IntentDocument")]
pub struct PaymentIntent {
    destination: Destination,
    amount: u64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IntentDocument {
    destination: String,
    amount: u64,
}

impl TryFrom<IntentDocument> for PaymentIntent {
    type Error = IntentError;

    fn try_from(doc: IntentDocument) -> Result<Self, Self::Error> {
        PaymentIntent::new(doc.destination, doc.amount)
    }
}

impl PaymentIntent {
    /// # Errors
    ///
    /// Empty or oversized destination, or a zero amount.
    pub fn new(destination: impl AsRef<str>, amount: u64) -> Result<Self, IntentError> {
        let destination = Destination::parse(destination)?;
        if amount == 0 {
            return Err(IntentError::ZeroAmount);
        }
        Ok(Self {
            destination,
            amount,
        })
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Re-run the shape checks. Intents built through [`PaymentIntent::new()`]
    /// always pass; the prover calls this before touching the circuit.
    pub fn validate(&self) -> Result<(), IntentError> {
        Self::new(self.destination.as_str(), self.amount).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::DestinationError;

    #[test]
    fn valid_intent() {
        let i = PaymentIntent::new(" 0xD1 ", 6).unwrap();
        assert_eq!(i.destination().as_str(), "0xd1");
        assert_eq!(i.amount(), 6);
        assert!(i.validate().is_ok());
    }

    #[test]
    fn zero_amount_rejected() {
        assert_eq!(PaymentIntent::new("0xD1", 0), Err(IntentError::ZeroAmount));
    }

    #[test]
    fn blank_destination_rejected() {
        assert_eq!(
            PaymentIntent::new("   ", 5),
            Err(IntentError::Destination(DestinationError::Empty))
        );
    }

    #[test]
    fn max_amount_is_representable() {
        assert!(PaymentIntent::new("x", u64::MAX).is_ok());
    }

    #[test]
    fn json_deserialization_checks_shape() {
        let ok: PaymentIntent = serde_json::from_str(r#"{"destination":"0xD1","amount":6}"#).unwrap();
        assert_eq!(ok.amount(), 6);
        assert!(serde_json::from_str::<PaymentIntent>(r#"{"destination":"0xD1","amount":0}"#).is_err());
        assert!(serde_json::from_str::<PaymentIntent>(r#"{"destination":"0xD1","amount":-1}"#).is_err());
    }
}
