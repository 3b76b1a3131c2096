//! JSON-RPC 2.0 client for a proof-verifying contract endpoint.
//!
//! Request:
//!
//! ```json
//! {"jsonrpc":"2.0","method":"zkpay_verifyPaymentProof","params":[<submission>],"id":1}
//! ```
//!
//! The `result` must decode as `{"verified": bool, "receipt": string?}`. A
//! JSON-RPC `error` object means the contract reverted.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{OracleError, OracleSubmission, OracleVerdict, VerificationOracle};

pub const DEFAULT_ORACLE_METHOD: &str = "zkpay_verifyPaymentProof";
pub const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 10_000;

fn default_method() -> String {
    DEFAULT_ORACLE_METHOD.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_ORACLE_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// JSON-RPC endpoint (e.g., `https://rpc.example.org`).
    pub rpc_url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl OracleConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            method: default_method(),
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug)]
pub struct JsonRpcOracle {
    config: OracleConfig,
    client: reqwest::Client,
}

impl JsonRpcOracle {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                OracleError::Unreachable(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    async fn rpc_call(&self, params: serde_json::Value) -> Result<serde_json::Value, OracleError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": self.config.method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.config.timeout())
                } else {
                    OracleError::Unreachable(format!("{}: {e}", self.config.rpc_url))
                }
            })?;

        if !resp.status().is_success() {
            return Err(OracleError::Unreachable(format!(
                "{}: HTTP {}",
                self.config.rpc_url,
                resp.status()
            )));
        }

        let json: serde_json::Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout(self.config.timeout())
            } else {
                OracleError::InvalidResponse(format!("invalid JSON: {e}"))
            }
        })?;

        if let Some(error) = json.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error");
            return Err(OracleError::Reverted(msg.to_string()));
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| OracleError::InvalidResponse("missing result field".into()))
    }
}

#[async_trait]
impl VerificationOracle for JsonRpcOracle {
    fn name(&self) -> &str {
        "json-rpc"
    }

    async fn submit(&self, submission: &OracleSubmission) -> Result<OracleVerdict, OracleError> {
        let params = serde_json::to_value(submission)
            .map_err(|e| OracleError::InvalidSubmission(e.to_string()))?;
        let result = self.rpc_call(serde_json::json!([params])).await?;
        serde_json::from_value(result).map_err(|e| OracleError::InvalidResponse(e.to_string()))
    }
}
