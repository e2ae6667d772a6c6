use crate::SignerAdapterConfig;

/// Links into the block explorer front-end.
#[derive(Debug, Clone)]
pub struct ExplorerLinks {
    explorer_url: String,
}

impl ExplorerLinks {
    pub fn with_config(config: &SignerAdapterConfig) -> Self {
        Self {
            explorer_url: config.explorer_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn transaction_url(&self, tx_id: &str) -> String {
        format!("{}/transactions/{}", self.explorer_url, tx_id)
    }

    pub fn address_url(&self, address_hash: &str) -> String {
        format!("{}/addresses/{}", self.explorer_url, address_hash)
    }
}
