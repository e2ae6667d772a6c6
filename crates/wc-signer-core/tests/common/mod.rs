#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use alloy::primitives::{B256, U256};

use wc_signer_core::{
    AddressHandle, DecodedUnsignedTx, PendingSessionRequest, PortError, PrivateKey, SessionError,
    SessionResponsePort, SignError, SignedTxResult, SigningCoordinator, TelemetryPort,
    TxDecoderPort, TxSignerPort, UnsignedTransactionRequest,
};

pub const KEY_HEX: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Success(PendingSessionRequest, SignedTxResult),
    Error(PendingSessionRequest, SessionError),
}

/// Decoder returning canned results keyed by unsigned tx.
#[derive(Debug, Clone, Default)]
pub struct FakeDecoder {
    pub replies: Rc<RefCell<HashMap<String, DecodedUnsignedTx>>>,
    pub calls: Rc<RefCell<Vec<String>>>,
}

impl FakeDecoder {
    pub fn with_reply(unsigned_tx: &str, tx_id: &str) -> Self {
        let d = Self::default();
        d.replies
            .borrow_mut()
            .insert(unsigned_tx.to_owned(), decoded(unsigned_tx, tx_id));
        d
    }
}

impl TxDecoderPort for FakeDecoder {
    fn decode_unsigned_tx(&self, unsigned_tx: &str) -> Result<DecodedUnsignedTx, PortError> {
        self.calls.borrow_mut().push(unsigned_tx.to_owned());
        self.replies
            .borrow()
            .get(unsigned_tx)
            .cloned()
            .ok_or_else(|| PortError::Transport("node rejected unsigned tx".to_owned()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeSigner {
    pub fail: bool,
    pub calls: Rc<RefCell<Vec<String>>>,
}

impl TxSignerPort for FakeSigner {
    fn sign_unsigned_tx(&self, unsigned_tx: &str, _key: &PrivateKey) -> Result<String, SignError> {
        self.calls.borrow_mut().push(unsigned_tx.to_owned());
        if self.fail {
            return Err(SignError::Crypto("hsm unavailable".to_owned()));
        }
        Ok(format!("sig-{unsigned_tx}"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSessions {
    pub responses: Rc<RefCell<Vec<Recorded>>>,
    pub fail: bool,
}

impl RecordingSessions {
    pub fn successes(&self) -> usize {
        self.responses
            .borrow()
            .iter()
            .filter(|r| matches!(r, Recorded::Success(..)))
            .count()
    }

    pub fn errors(&self) -> Vec<SessionError> {
        self.responses
            .borrow()
            .iter()
            .filter_map(|r| match r {
                Recorded::Error(_, e) => Some(e.clone()),
                Recorded::Success(..) => None,
            })
            .collect()
    }

    pub fn for_request(&self, handle: &PendingSessionRequest) -> usize {
        self.responses
            .borrow()
            .iter()
            .filter(|r| match r {
                Recorded::Success(p, _) | Recorded::Error(p, _) => p == handle,
            })
            .count()
    }
}

impl SessionResponsePort for RecordingSessions {
    fn respond_success(
        &self,
        request: &PendingSessionRequest,
        result: &SignedTxResult,
    ) -> Result<(), PortError> {
        self.responses
            .borrow_mut()
            .push(Recorded::Success(request.clone(), result.clone()));
        if self.fail {
            return Err(PortError::Transport("relay offline".to_owned()));
        }
        Ok(())
    }

    fn respond_error(
        &self,
        request: &PendingSessionRequest,
        error: &SessionError,
    ) -> Result<(), PortError> {
        self.responses
            .borrow_mut()
            .push(Recorded::Error(request.clone(), error.clone()));
        if self.fail {
            return Err(PortError::Transport("relay offline".to_owned()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingTelemetry {
    pub events: Rc<RefCell<Vec<(String, String)>>>,
}

impl TelemetryPort for RecordingTelemetry {
    fn capture(&self, event: &str, message: &str) {
        self.events
            .borrow_mut()
            .push((event.to_owned(), message.to_owned()));
    }
}

pub type TestCoordinator =
    SigningCoordinator<FakeDecoder, FakeSigner, RecordingSessions, RecordingTelemetry>;

pub fn new_coordinator(decoder: FakeDecoder, signer: FakeSigner) -> TestCoordinator {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    SigningCoordinator::new(
        decoder,
        signer,
        RecordingSessions::default(),
        RecordingTelemetry::default(),
    )
}

pub fn decoded(unsigned_tx: &str, tx_id: &str) -> DecodedUnsignedTx {
    DecodedUnsignedTx {
        tx_id: tx_id.to_owned(),
        from_group: 0,
        to_group: 0,
        unsigned_tx: unsigned_tx.to_owned(),
        gas_amount: 100,
        gas_price: U256::from(1u64),
    }
}

pub fn address_a() -> AddressHandle {
    let key: B256 = KEY_HEX.parse().expect("key hex");
    AddressHandle::new(
        "1DrDyTr9RpRsQnDnXo2YRiPzPW4ooHX5LLoqXrqfMrpQH",
        0,
        PrivateKey::new(key),
    )
}

pub fn pending(id: u64) -> PendingSessionRequest {
    pending_on(id, "topic-1")
}

pub fn pending_on(id: u64, topic: &str) -> PendingSessionRequest {
    PendingSessionRequest {
        id,
        topic: topic.to_owned(),
    }
}

pub fn request(unsigned_tx: &str) -> UnsignedTransactionRequest {
    UnsignedTransactionRequest {
        unsigned_tx: unsigned_tx.to_owned(),
        from_address: address_a(),
    }
}
