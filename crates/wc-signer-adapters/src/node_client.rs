use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use wc_signer_core::{DecodeUnsignedTxReply, DecodedUnsignedTx, PortError, TxDecoderPort};

use crate::throttle::RequestThrottle;
use crate::SignerAdapterConfig;

const DECODE_UNSIGNED_TX_PATH: &str = "/transactions/decode-unsigned-tx";

/// Decodes unsigned transactions through a full node's REST API.
#[derive(Debug, Clone)]
pub struct NodeDecodeClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    throttle: RequestThrottle,
}

impl NodeDecodeClient {
    pub fn with_config(config: &SignerAdapterConfig) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.node_timeout_ms))
            .build()
            .map_err(|e| PortError::Transport(format!("failed to build node client: {e}")))?;
        Ok(Self {
            base_url: config.node_host.trim_end_matches('/').to_owned(),
            api_key: config.node_api_key.clone(),
            client,
            throttle: RequestThrottle::new(config.max_concurrent_requests),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn throttle(&self) -> &RequestThrottle {
        &self.throttle
    }
}

impl TxDecoderPort for NodeDecodeClient {
    fn decode_unsigned_tx(&self, unsigned_tx: &str) -> Result<DecodedUnsignedTx, PortError> {
        let _permit = self.throttle.acquire()?;
        let url = format!("{}{}", self.base_url, DECODE_UNSIGNED_TX_PATH);
        let mut request = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "unsignedTx": unsigned_tx }));
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", key);
        }

        let response = request
            .send()
            .map_err(|e| PortError::Transport(format!("node decode request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(PortError::Transport(format!(
                "node decode status {status}: {}",
                error_detail(&text)
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("node decode json decode failed: {e}")))?;
        let reply: DecodeUnsignedTxReply = serde_json::from_value(body)
            .map_err(|e| PortError::Validation(format!("unexpected decode reply shape: {e}")))?;
        debug!(tx_id = %reply.unsigned_tx.tx_id, "node decoded unsigned tx");
        DecodedUnsignedTx::from_node_reply(unsigned_tx, reply)
    }
}

/// The node's `detail` field when the error body is JSON, the raw body otherwise.
fn error_detail(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| text.trim().to_owned())
}
