use std::fmt;

use alloy::primitives::{B256, U256};
use serde::{Deserialize, Serialize};

use crate::ports::PortError;

/// Number of hash characters kept when an address has no label.
const SHORT_HASH_LEN: usize = 10;

/// Secret key of a wallet address. Never printed, never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(B256);

impl PrivateKey {
    pub fn new(bytes: B256) -> Self {
        Self(bytes)
    }

    pub fn from_hex(value: &str) -> Result<Self, PortError> {
        value
            .trim()
            .parse::<B256>()
            .map(Self)
            .map_err(|e| PortError::Validation(format!("invalid private key hex: {e}")))
    }

    pub fn expose(&self) -> &B256 {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressHandle {
    pub hash: String,
    pub group: u32,
    pub label: Option<String>,
    pub balance: U256,
    pub locked_balance: U256,
    #[serde(skip)]
    pub private_key: PrivateKey,
}

impl AddressHandle {
    pub fn new(hash: impl Into<String>, group: u32, private_key: PrivateKey) -> Self {
        Self {
            hash: hash.into(),
            group,
            label: None,
            balance: U256::ZERO,
            locked_balance: U256::ZERO,
            private_key,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_balances(mut self, balance: U256, locked_balance: U256) -> Self {
        self.balance = balance;
        self.locked_balance = locked_balance;
        self
    }

    pub fn available_balance(&self) -> U256 {
        self.balance.saturating_sub(self.locked_balance)
    }

    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => {
                let short: String = self.hash.chars().take(SHORT_HASH_LEN).collect();
                format!("{short}...")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransactionRequest {
    pub unsigned_tx: String,
    pub from_address: AddressHandle,
}

/// Handle of the WalletConnect request awaiting a response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingSessionRequest {
    pub id: u64,
    pub topic: String,
}

/// Reply body of the node's `decode-unsigned-tx` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeUnsignedTxReply {
    pub unsigned_tx: UnsignedTxSummary,
    pub from_group: u32,
    pub to_group: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTxSummary {
    pub tx_id: String,
    pub gas_amount: u64,
    pub gas_price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedUnsignedTx {
    pub tx_id: String,
    pub from_group: u32,
    pub to_group: u32,
    pub unsigned_tx: String,
    pub gas_amount: u64,
    #[serde(with = "decimal_u256")]
    pub gas_price: U256,
}

impl DecodedUnsignedTx {
    /// Normalizes a node reply. The blob is kept as submitted, not as echoed.
    pub fn from_node_reply(unsigned_tx: &str, reply: DecodeUnsignedTxReply) -> Result<Self, PortError> {
        let gas_price = U256::from_str_radix(reply.unsigned_tx.gas_price.trim(), 10).map_err(|e| {
            PortError::Validation(format!(
                "invalid gasPrice {:?} in decode reply: {e}",
                reply.unsigned_tx.gas_price
            ))
        })?;
        Ok(Self {
            tx_id: reply.unsigned_tx.tx_id,
            from_group: reply.from_group,
            to_group: reply.to_group,
            unsigned_tx: unsigned_tx.to_owned(),
            gas_amount: reply.unsigned_tx.gas_amount,
            gas_price,
        })
    }

    /// Label/value pairs shown to the user before confirming.
    pub fn review_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Transaction Id", self.tx_id.clone()),
            ("Unsigned Transaction", self.unsigned_tx.clone()),
            ("Gas Amount", self.gas_amount.to_string()),
            ("Gas Price", self.gas_price.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTxResult {
    #[serde(flatten)]
    pub decoded: DecodedUnsignedTx,
    pub signature: String,
}

impl SignedTxResult {
    pub fn to_json(&self) -> Result<serde_json::Value, PortError> {
        serde_json::to_value(self)
            .map_err(|e| PortError::Validation(format!("sign result serialization failed: {e}")))
    }
}

/// WalletConnect error codes used when resolving a request with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WcErrorCode {
    UserRejectedEvents,
    TransactionSendFailed,
    ParsingSessionRequestFailed,
    TransactionBuildFailed,
    TransactionSignFailed,
    TransactionDecodeFailed,
}

impl WcErrorCode {
    pub fn code(self) -> i64 {
        match self {
            Self::UserRejectedEvents => 5003,
            Self::TransactionSendFailed => -32000,
            Self::ParsingSessionRequestFailed => -33000,
            Self::TransactionBuildFailed => -34000,
            Self::TransactionSignFailed => -35000,
            Self::TransactionDecodeFailed => -36000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
    pub code: i64,
    pub message: String,
}

impl SessionError {
    pub fn new(code: WcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(WcErrorCode::UserRejectedEvents, "User rejected events.")
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == WcErrorCode::UserRejectedEvents.code()
    }
}

/// Serializes `U256` as a base-10 string, the way the wallet hands bigints to dApps.
mod decimal_u256 {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_str_radix(raw.trim(), 10).map_err(serde::de::Error::custom)
    }
}
