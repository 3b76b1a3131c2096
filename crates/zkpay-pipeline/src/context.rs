//! # Authorization Context
//!
//! Owns the handles a run needs: prover, verifier, optional rule ledger,
//! optional executor, and the stage observer. Built once per process and
//! passed explicitly; there is no global state. Every handle is an `Arc`
//! and holds no per-run data, so concurrent runs share one context.

use std::sync::Arc;

use zkpay_zkp::{
    ArtifactStore, JsonRpcOracle, LocalStructuralVerifier, OnChainVerifier, OracleError, Prover,
    VerificationOracle, Verifier,
};

use crate::config::PipelineConfig;
use crate::executor::PaymentExecutor;
use crate::ledger::RuleLedger;
use crate::observer::{StageObserver, TracingObserver};

#[derive(Clone)]
pub struct AuthorizationContext {
    pub(crate) prover: Arc<Prover>,
    pub(crate) verifier: Arc<Verifier>,
    pub(crate) ledger: Option<Arc<dyn RuleLedger>>,
    pub(crate) executor: Option<Arc<dyn PaymentExecutor>>,
    pub(crate) observer: Arc<dyn StageObserver>,
}

impl AuthorizationContext {
    pub fn new(prover: Prover, verifier: Verifier) -> Self {
        Self {
            prover: Arc::new(prover),
            verifier: Arc::new(verifier),
            ledger: None,
            executor: None,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Prover and verifier as described by `config`. The oracle, when
    /// configured, is a [`JsonRpcOracle`].
    pub fn from_config(config: &PipelineConfig) -> Result<Self, OracleError> {
        let prover = match &config.artifacts_dir {
            Some(dir) => Prover::new(ArtifactStore::new(dir)),
            None => Prover::without_artifacts(),
        };
        let oracle: Option<Arc<dyn VerificationOracle>> = match &config.oracle {
            Some(oracle) => Some(Arc::new(JsonRpcOracle::new(oracle.clone())?)),
            None => None,
        };
        Ok(Self::new(prover, verifier_for(config, oracle)))
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn RuleLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn PaymentExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn prover(&self) -> &Prover {
        &self.prover
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }
}

/// Verifier for `config`, using `oracle` for the on-chain path.
pub fn verifier_for(
    config: &PipelineConfig,
    oracle: Option<Arc<dyn VerificationOracle>>,
) -> Verifier {
    let on_chain =
        oracle.map(|o| OnChainVerifier::new(o).with_timeout(config.oracle_timeout()));
    Verifier::new(
        on_chain,
        LocalStructuralVerifier {
            accept_unproven: config.accept_unproven,
        },
    )
}

impl std::fmt::Debug for AuthorizationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationContext")
            .field("prover", &self.prover)
            .field("verifier", &self.verifier)
            .field("ledger", &self.ledger.is_some())
            .field("executor", &self.executor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_without_oracle_is_local_only() {
        let ctx = AuthorizationContext::from_config(&PipelineConfig::default()).unwrap();
        assert!(!ctx.verifier().has_oracle());
        assert!(ctx.prover().store().is_none());
    }

    #[test]
    fn config_with_oracle_and_keys() {
        let cfg = PipelineConfig::from_yaml_str(
            "artifacts_dir: /tmp/keys\noracle:\n  rpc_url: http://127.0.0.1:8545\n",
        )
        .unwrap();
        let ctx = AuthorizationContext::from_config(&cfg).unwrap();
        assert!(ctx.verifier().has_oracle());
        assert!(ctx.prover().store().is_some());
    }
}
