pub mod coordinator;
pub mod domain;
pub mod ledger;
pub mod ports;
pub mod state_machine;

pub use coordinator::{DecodeTicket, FlowOutcome, SigningCommand, SigningCoordinator};
pub use domain::{
    AddressHandle, DecodeUnsignedTxReply, DecodedUnsignedTx, PendingSessionRequest, PrivateKey,
    SessionError, SignedTxResult, UnsignedTransactionRequest, UnsignedTxSummary, WcErrorCode,
};
pub use ledger::{ResponseLedger, DEFAULT_LEDGER_RETENTION};
pub use ports::{
    PortError, SessionResponsePort, SignError, TelemetryPort, TxDecoderPort, TxSignerPort,
};
pub use state_machine::{signing_transition, SigningAction, SigningState, StateTransition};
