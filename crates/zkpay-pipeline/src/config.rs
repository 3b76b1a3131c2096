//! # Pipeline Configuration
//!
//! YAML file, then environment overrides:
//!
//! - `ZKPAY_ARTIFACTS_DIR` replaces `artifacts_dir`.
//! - `ZKPAY_ORACLE_URL` replaces `oracle.rpc_url`, enabling the oracle with
//!   default settings if the file did not configure one.
//!
//! ```yaml
//! artifacts_dir: ./keys
//! oracle:
//!   rpc_url: https://rpc.example.org
//!   method: zkpay_verifyPaymentProof
//!   timeout_ms: 8000
//! oracle_timeout_ms: 10000
//! accept_unproven: false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkpay_zkp::oracle::{OracleConfig, DEFAULT_ORACLE_TIMEOUT_MS};

pub const ENV_ARTIFACTS_DIR: &str = "ZKPAY_ARTIFACTS_DIR";
pub const ENV_ORACLE_URL: &str = "ZKPAY_ORACLE_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

fn default_oracle_timeout_ms() -> u64 {
    DEFAULT_ORACLE_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory with `rule_validation.pk`, `.vk` and `manifest.json`.
    /// Without it every proof is direct evaluation.
    #[serde(default)]
    pub artifacts_dir: Option<PathBuf>,

    #[serde(default)]
    pub oracle: Option<OracleConfig>,

    /// Upper bound on one oracle round trip, enforced by the verifier.
    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,

    /// Let local fallback accept direct-evaluation artifacts.
    #[serde(default)]
    pub accept_unproven: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: None,
            oracle: None,
            oracle_timeout_ms: default_oracle_timeout_ms(),
            accept_unproven: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Apply `ZKPAY_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(dir) = lookup(ENV_ARTIFACTS_DIR).filter(|s| !s.trim().is_empty()) {
            self.artifacts_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = lookup(ENV_ORACLE_URL).filter(|s| !s.trim().is_empty()) {
            match self.oracle.as_mut() {
                Some(oracle) => oracle.rpc_url = url,
                None => self.oracle = Some(OracleConfig::new(url)),
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.oracle_timeout_ms == 0 {
            return Err(ConfigError::Invalid("oracle_timeout_ms must be positive".into()));
        }
        if let Some(oracle) = &self.oracle {
            if !(oracle.rpc_url.starts_with("http://") || oracle.rpc_url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "oracle.rpc_url must be an http(s) URL, got {:?}",
                    oracle.rpc_url
                )));
            }
            if oracle.timeout_ms == 0 {
                return Err(ConfigError::Invalid("oracle.timeout_ms must be positive".into()));
            }
        }
        Ok(())
    }
}
