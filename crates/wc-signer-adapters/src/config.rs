use std::env;

use tracing::warn;

use wc_signer_core::DEFAULT_LEDGER_RETENTION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkPreset {
    Mainnet,
    Testnet,
    Localhost,
}

impl NetworkPreset {
    pub fn node_host(self) -> &'static str {
        match self {
            Self::Mainnet => "https://node.mainnet.alephium.org",
            Self::Testnet => "https://node.testnet.alephium.org",
            Self::Localhost => "http://127.0.0.1:22973",
        }
    }

    pub fn explorer_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://explorer.alephium.org",
            Self::Testnet => "https://testnet.alephium.org",
            Self::Localhost => "http://localhost:23000",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Some(Self::Mainnet),
            "testnet" => Some(Self::Testnet),
            "localhost" => Some(Self::Localhost),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignerAdapterConfig {
    pub node_host: String,
    pub node_api_key: Option<String>,
    pub explorer_url: String,
    pub relay_url: Option<String>,
    pub node_timeout_ms: u64,
    pub max_concurrent_requests: usize,
    /// How many answered request handles are remembered to refuse re-delivery.
    pub resolved_request_retention: usize,
}

impl Default for SignerAdapterConfig {
    fn default() -> Self {
        Self::for_network(NetworkPreset::Mainnet)
    }
}

impl SignerAdapterConfig {
    pub fn for_network(network: NetworkPreset) -> Self {
        Self {
            node_host: network.node_host().to_owned(),
            node_api_key: None,
            explorer_url: network.explorer_url().to_owned(),
            relay_url: None,
            node_timeout_ms: 15_000,
            max_concurrent_requests: 5,
            resolved_request_retention: DEFAULT_LEDGER_RETENTION,
        }
    }

    /// Defaults for `WC_SIGNER_NETWORK`, overridden by the individual variables.
    pub fn from_env() -> Self {
        let network = match env::var("WC_SIGNER_NETWORK") {
            Ok(raw) => NetworkPreset::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "unknown WC_SIGNER_NETWORK, using mainnet");
                NetworkPreset::Mainnet
            }),
            Err(_) => NetworkPreset::Mainnet,
        };
        let mut cfg = Self::for_network(network);
        if let Some(v) = non_empty_var("WC_SIGNER_NODE_HOST") {
            cfg.node_host = v;
        }
        cfg.node_api_key = non_empty_var("WC_SIGNER_NODE_API_KEY");
        if let Some(v) = non_empty_var("WC_SIGNER_EXPLORER_URL") {
            cfg.explorer_url = v;
        }
        cfg.relay_url = non_empty_var("WC_SIGNER_RELAY_URL");
        if let Some(v) = parse_var::<u64>("WC_SIGNER_NODE_TIMEOUT_MS") {
            cfg.node_timeout_ms = v;
        }
        if let Some(v) = parse_var::<usize>("WC_SIGNER_MAX_CONCURRENT_REQUESTS") {
            cfg.max_concurrent_requests = v.max(1);
        }
        if let Some(v) = parse_var::<usize>("WC_SIGNER_RESOLVED_REQUEST_RETENTION") {
            cfg.resolved_request_retention = v.max(1);
        }
        cfg
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = non_empty_var(name)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparseable config value");
            None
        }
    }
}
