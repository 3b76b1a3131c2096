//! Rule commitment ledger: the current commitment per user. Writes are
//! last-commit-wins; the pipeline reads the entry back before verifying to
//! notice rules replaced while a run was in flight.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use zkpay_core::UserId;
use zkpay_rules::RuleCommitment;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("rule ledger unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RuleLedger: Send + Sync {
    async fn record(&self, user: &UserId, commitment: &RuleCommitment) -> Result<(), LedgerError>;

    async fn current(&self, user: &UserId) -> Result<Option<RuleCommitment>, LedgerError>;
}

#[derive(Debug, Default)]
pub struct InMemoryRuleLedger {
    entries: RwLock<HashMap<UserId, RuleCommitment>>,
}

impl InMemoryRuleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl RuleLedger for InMemoryRuleLedger {
    async fn record(&self, user: &UserId, commitment: &RuleCommitment) -> Result<(), LedgerError> {
        self.entries.write().insert(user.clone(), commitment.clone());
        Ok(())
    }

    async fn current(&self, user: &UserId) -> Result<Option<RuleCommitment>, LedgerError> {
        Ok(self.entries.read().get(user).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkpay_rules::{RuleEncoder, RuleSet};

    #[tokio::test]
    async fn last_commit_wins() {
        let ledger = InMemoryRuleLedger::new();
        let user = UserId::new("alice").unwrap();
        let a = RuleEncoder::commit(&RuleSet::new(["0xa1"], 1, 0, 23).unwrap()).unwrap();
        let b = RuleEncoder::commit(&RuleSet::new(["0xb1"], 1, 0, 23).unwrap()).unwrap();

        assert_eq!(ledger.current(&user).await.unwrap(), None);
        ledger.record(&user, &a).await.unwrap();
        ledger.record(&user, &b).await.unwrap();
        assert_eq!(ledger.current(&user).await.unwrap(), Some(b));
        assert_eq!(ledger.len(), 1);
    }
}
