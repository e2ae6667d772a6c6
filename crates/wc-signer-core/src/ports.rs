use thiserror::Error;

use crate::domain::{
    DecodedUnsignedTx, PendingSessionRequest, PrivateKey, SessionError, SignedTxResult,
};

#[derive(Debug, Error)]
pub enum PortError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("session request already resolved: {0}")]
    AlreadyResolved(String),
}

/// Failure of the local signing step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("unsigned tx is not valid hex: {0}")]
    InvalidPayload(String),
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("signature computation failed: {0}")]
    Crypto(String),
}

pub trait TxDecoderPort {
    fn decode_unsigned_tx(&self, unsigned_tx: &str) -> Result<DecodedUnsignedTx, PortError>;
}

pub trait TxSignerPort {
    /// Returns the hex signature of `unsigned_tx` under `key`.
    fn sign_unsigned_tx(&self, unsigned_tx: &str, key: &PrivateKey) -> Result<String, SignError>;
}

pub trait SessionResponsePort {
    fn respond_success(
        &self,
        request: &PendingSessionRequest,
        result: &SignedTxResult,
    ) -> Result<(), PortError>;
    fn respond_error(
        &self,
        request: &PendingSessionRequest,
        error: &SessionError,
    ) -> Result<(), PortError>;
}

pub trait TelemetryPort {
    fn capture(&self, event: &str, message: &str);
}
