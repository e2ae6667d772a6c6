use alloy::primitives::{hex, keccak256, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use wc_signer_core::{PrivateKey, SignError, TxSignerPort};

/// Signs with the secp256k1 key held by the wallet. Keys never leave the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalKeySigner;

impl LocalKeySigner {
    /// Digest covered by the signature: keccak256 of the hex-decoded blob.
    pub fn signing_digest(unsigned_tx: &str) -> Result<B256, SignError> {
        let payload = hex::decode(unsigned_tx.trim())
            .map_err(|e| SignError::InvalidPayload(e.to_string()))?;
        if payload.is_empty() {
            return Err(SignError::InvalidPayload("empty unsigned tx".to_owned()));
        }
        Ok(keccak256(&payload))
    }
}

impl TxSignerPort for LocalKeySigner {
    fn sign_unsigned_tx(&self, unsigned_tx: &str, key: &PrivateKey) -> Result<String, SignError> {
        let digest = Self::signing_digest(unsigned_tx)?;
        let signer = PrivateKeySigner::from_bytes(key.expose())
            .map_err(|e| SignError::InvalidKey(e.to_string()))?;
        let signature = signer
            .sign_hash_sync(&digest)
            .map_err(|e| SignError::Crypto(e.to_string()))?;
        Ok(hex::encode(signature.as_bytes()))
    }
}
