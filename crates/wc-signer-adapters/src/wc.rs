use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use wc_signer_core::{
    PendingSessionRequest, PortError, SessionError, SessionResponsePort, SignedTxResult,
};

use crate::SignerAdapterConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResponse {
    Success(Value),
    Error(SessionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponseRecord {
    pub request: PendingSessionRequest,
    pub response: SessionResponse,
}

/// Session response channel. Either keeps requests in memory or forwards
/// responses to a WalletConnect relay bridge over HTTP.
///
/// Only the in-memory mode records sent responses; the relay is the record
/// of truth otherwise.
#[derive(Debug, Clone, Default)]
pub struct WalletConnectAdapter {
    mode: ChannelMode,
    inner: Arc<Mutex<WalletConnectState>>,
}

#[derive(Debug, Clone, Default)]
enum ChannelMode {
    #[default]
    InMemory,
    Relay(RelayRuntime),
}

#[derive(Debug, Clone)]
struct RelayRuntime {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Default)]
struct WalletConnectState {
    requests: HashSet<PendingSessionRequest>,
    responses: Vec<SessionResponseRecord>,
}

impl WalletConnectAdapter {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Relay mode when `relay_url` is configured, in-memory otherwise.
    pub fn with_config(config: &SignerAdapterConfig) -> Result<Self, PortError> {
        let Some(base_url) = &config.relay_url else {
            return Ok(Self::in_memory());
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.node_timeout_ms))
            .build()
            .map_err(|e| PortError::Transport(format!("failed to build relay client: {e}")))?;
        Ok(Self {
            mode: ChannelMode::Relay(RelayRuntime {
                base_url: base_url.trim_end_matches('/').to_owned(),
                client,
            }),
            inner: Arc::default(),
        })
    }

    pub fn insert_request(&self, req: PendingSessionRequest) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.requests.insert(req);
        Ok(())
    }

    pub fn list_pending_requests(&self) -> Result<Vec<PendingSessionRequest>, PortError> {
        let g = self.lock()?;
        let mut out: Vec<_> = g.requests.iter().cloned().collect();
        out.sort_by(|a, b| (a.id, &a.topic).cmp(&(b.id, &b.topic)));
        Ok(out)
    }

    pub fn responses(&self) -> Result<Vec<SessionResponseRecord>, PortError> {
        let g = self.lock()?;
        Ok(g.responses.clone())
    }

    fn respond(&self, request: &PendingSessionRequest, response: SessionResponse) -> Result<(), PortError> {
        match &self.mode {
            ChannelMode::InMemory => {
                let mut g = self.lock()?;
                if !g.requests.remove(request) {
                    return Err(PortError::NotFound(format!(
                        "wc request missing for response: {} on topic {}",
                        request.id, request.topic
                    )));
                }
                g.responses.push(SessionResponseRecord {
                    request: request.clone(),
                    response,
                });
            }
            ChannelMode::Relay(relay) => {
                relay.post(request, &response)?;
                self.lock()?.requests.remove(request);
            }
        }
        debug!(request_id = request.id, topic = %request.topic, "wc response sent");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, WalletConnectState>, PortError> {
        self.inner
            .lock()
            .map_err(|e| PortError::Transport(format!("wc lock poisoned: {e}")))
    }
}

impl RelayRuntime {
    fn post(&self, request: &PendingSessionRequest, response: &SessionResponse) -> Result<(), PortError> {
        let (path, body) = match response {
            SessionResponse::Success(result) => (
                "response",
                serde_json::json!({ "topic": request.topic, "result": result }),
            ),
            SessionResponse::Error(error) => (
                "error",
                serde_json::json!({ "topic": request.topic, "error": error }),
            ),
        };
        let url = format!("{}/requests/{}/{}", self.base_url, request.id, path);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| PortError::Transport(format!("wc relay request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(PortError::Transport(format!(
                "wc relay status {status}: {text}"
            )));
        }
        Ok(())
    }
}

impl SessionResponsePort for WalletConnectAdapter {
    fn respond_success(
        &self,
        request: &PendingSessionRequest,
        result: &SignedTxResult,
    ) -> Result<(), PortError> {
        self.respond(request, SessionResponse::Success(result.to_json()?))
    }

    fn respond_error(
        &self,
        request: &PendingSessionRequest,
        error: &SessionError,
    ) -> Result<(), PortError> {
        self.respond(request, SessionResponse::Error(error.clone()))
    }
}
