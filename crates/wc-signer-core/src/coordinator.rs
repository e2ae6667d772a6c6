use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::domain::{
    DecodedUnsignedTx, PendingSessionRequest, SessionError, SignedTxResult,
    UnsignedTransactionRequest, WcErrorCode,
};
use crate::ledger::ResponseLedger;
use crate::ports::{PortError, SessionResponsePort, TelemetryPort, TxDecoderPort, TxSignerPort};
use crate::state_machine::{signing_transition, SigningAction, SigningState};

#[derive(Debug, Clone)]
pub enum SigningCommand {
    Start {
        pending: PendingSessionRequest,
        request: UnsignedTransactionRequest,
    },
    Confirm {
        pending: PendingSessionRequest,
    },
    Cancel {
        pending: PendingSessionRequest,
    },
}

/// Identifies one decode attempt. A result carrying an outdated ticket is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTicket {
    pub pending: PendingSessionRequest,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Ready(DecodedUnsignedTx),
    Succeeded(SignedTxResult),
    Failed(SessionError),
    Cancelled,
    Discarded,
}

#[derive(Debug)]
struct SigningFlow {
    request: UnsignedTransactionRequest,
    state: SigningState,
    generation: u64,
    decoded: Option<DecodedUnsignedTx>,
}

enum Response<'a> {
    Success(&'a SignedTxResult),
    Error(&'a SessionError),
}

type FlowTable = HashMap<PendingSessionRequest, SigningFlow>;

pub struct SigningCoordinator<D, S, W, T>
where
    D: TxDecoderPort,
    S: TxSignerPort,
    W: SessionResponsePort,
    T: TelemetryPort,
{
    pub decoder: D,
    pub signer: S,
    pub sessions: W,
    pub telemetry: T,
    flows: Mutex<FlowTable>,
    ledger: ResponseLedger,
    next_generation: AtomicU64,
}

impl<D, S, W, T> SigningCoordinator<D, S, W, T>
where
    D: TxDecoderPort,
    S: TxSignerPort,
    W: SessionResponsePort,
    T: TelemetryPort,
{
    pub fn new(decoder: D, signer: S, sessions: W, telemetry: T) -> Self {
        Self::with_ledger(decoder, signer, sessions, telemetry, ResponseLedger::default())
    }

    pub fn with_ledger(
        decoder: D,
        signer: S,
        sessions: W,
        telemetry: T,
        ledger: ResponseLedger,
    ) -> Self {
        Self {
            decoder,
            signer,
            sessions,
            telemetry,
            flows: Mutex::new(HashMap::new()),
            ledger,
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn handle(&self, command: SigningCommand) -> Result<FlowOutcome, PortError> {
        match command {
            SigningCommand::Start { pending, request } => self.start(pending, request),
            SigningCommand::Confirm { pending } => self.confirm(&pending),
            SigningCommand::Cancel { pending } => self.cancel(&pending),
        }
    }

    /// Registers the request and decodes it right away.
    pub fn start(
        &self,
        pending: PendingSessionRequest,
        request: UnsignedTransactionRequest,
    ) -> Result<FlowOutcome, PortError> {
        let ticket = self.receive(pending, request)?;
        self.decode(ticket)
    }

    pub fn receive(
        &self,
        pending: PendingSessionRequest,
        request: UnsignedTransactionRequest,
    ) -> Result<DecodeTicket, PortError> {
        if self.ledger.is_resolved(&pending)? {
            return Err(PortError::AlreadyResolved(format!(
                "request {} on topic {}",
                pending.id, pending.topic
            )));
        }
        let mut flows = self.lock_flows()?;
        if flows.contains_key(&pending) {
            return Err(PortError::Validation(format!(
                "session request {} on topic {} is already in flight",
                pending.id, pending.topic
            )));
        }
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            request_id = pending.id,
            topic = %pending.topic,
            from = %request.from_address.hash,
            "received unsigned tx signing request"
        );
        flows.insert(
            pending.clone(),
            SigningFlow {
                request,
                state: SigningState::Decoding,
                generation,
                decoded: None,
            },
        );
        Ok(DecodeTicket {
            pending,
            generation,
        })
    }

    /// Runs the decoder port for `ticket` and applies its result.
    pub fn decode(&self, ticket: DecodeTicket) -> Result<FlowOutcome, PortError> {
        let unsigned_tx = {
            let flows = self.lock_flows()?;
            match flows.get(&ticket.pending) {
                Some(flow) if is_current(flow, ticket.generation) => flow.request.unsigned_tx.clone(),
                _ => {
                    debug!(request_id = ticket.pending.id, "skipping decode for stale ticket");
                    return Ok(FlowOutcome::Discarded);
                }
            }
        };
        let result = self.decoder.decode_unsigned_tx(&unsigned_tx);
        self.complete_decode(ticket, result)
    }

    pub fn complete_decode(
        &self,
        ticket: DecodeTicket,
        result: Result<DecodedUnsignedTx, PortError>,
    ) -> Result<FlowOutcome, PortError> {
        let mut flows = self.lock_flows()?;
        let current = flows
            .get(&ticket.pending)
            .map(|flow| is_current(flow, ticket.generation))
            .unwrap_or(false);
        if !current {
            debug!(
                request_id = ticket.pending.id,
                topic = %ticket.pending.topic,
                generation = ticket.generation,
                "discarding stale decode result"
            );
            return Ok(FlowOutcome::Discarded);
        }

        match result {
            Ok(decoded) => {
                let flow = flows
                    .get_mut(&ticket.pending)
                    .ok_or_else(|| not_found(&ticket.pending))?;
                let (to, transition) = signing_transition(flow.state, SigningAction::DecodeSucceeded)?;
                flow.state = to;
                flow.decoded = Some(decoded.clone());
                info!(
                    request_id = ticket.pending.id,
                    tx_id = %decoded.tx_id,
                    reason = transition.reason,
                    "unsigned tx ready for review"
                );
                Ok(FlowOutcome::Ready(decoded))
            }
            Err(err) => {
                let flow = flows
                    .remove(&ticket.pending)
                    .ok_or_else(|| not_found(&ticket.pending))?;
                drop(flows);
                signing_transition(flow.state, SigningAction::DecodeFailed)?;
                warn!(request_id = ticket.pending.id, error = %err, "unsigned tx decode failed");
                self.telemetry.capture("Error", "Could not decode unsigned tx");
                let error = SessionError::new(
                    WcErrorCode::TransactionDecodeFailed,
                    format!("Error while decoding unsigned tx: {err}"),
                );
                self.resolve(&ticket.pending, Response::Error(&error))?;
                Ok(FlowOutcome::Failed(error))
            }
        }
    }

    /// Signs the reviewed transaction and answers the requester.
    pub fn confirm(&self, pending: &PendingSessionRequest) -> Result<FlowOutcome, PortError> {
        let (key, decoded) = {
            let mut flows = self.lock_flows()?;
            let flow = flows.get_mut(pending).ok_or_else(|| not_found(pending))?;
            let (to, _) = signing_transition(flow.state, SigningAction::Confirm)?;
            let decoded = flow.decoded.clone().ok_or_else(|| {
                PortError::Validation(format!("request {} has no decoded tx", pending.id))
            })?;
            flow.state = to;
            (flow.request.from_address.private_key.clone(), decoded)
        };

        let signed = self.signer.sign_unsigned_tx(&decoded.unsigned_tx, &key);
        self.lock_flows()?.remove(pending);

        match signed {
            Ok(signature) => {
                signing_transition(SigningState::Signing, SigningAction::SignSucceeded)?;
                let result = SignedTxResult { decoded, signature };
                self.resolve(pending, Response::Success(&result))?;
                info!(request_id = pending.id, tx_id = %result.decoded.tx_id, "unsigned tx signed");
                Ok(FlowOutcome::Succeeded(result))
            }
            Err(err) => {
                signing_transition(SigningState::Signing, SigningAction::SignFailed)?;
                warn!(request_id = pending.id, error = %err, "unsigned tx signing failed");
                self.telemetry.capture("Error", "Could not sign unsigned tx");
                let error = SessionError::new(
                    WcErrorCode::TransactionSignFailed,
                    format!("Error while signing unsigned tx: {err}"),
                );
                self.resolve(pending, Response::Error(&error))?;
                Ok(FlowOutcome::Failed(error))
            }
        }
    }

    pub fn cancel(&self, pending: &PendingSessionRequest) -> Result<FlowOutcome, PortError> {
        {
            let mut flows = self.lock_flows()?;
            let state = flows
                .get(pending)
                .map(|flow| flow.state)
                .ok_or_else(|| not_found(pending))?;
            signing_transition(state, SigningAction::Cancel)?;
            flows.remove(pending);
        }
        info!(request_id = pending.id, topic = %pending.topic, "user rejected unsigned tx signing");
        self.resolve(pending, Response::Error(&SessionError::user_rejected()))?;
        Ok(FlowOutcome::Cancelled)
    }

    pub fn review(&self, pending: &PendingSessionRequest) -> Result<Option<DecodedUnsignedTx>, PortError> {
        let flows = self.lock_flows()?;
        Ok(flows.get(pending).and_then(|flow| flow.decoded.clone()))
    }

    pub fn state(&self, pending: &PendingSessionRequest) -> Result<Option<SigningState>, PortError> {
        let flows = self.lock_flows()?;
        Ok(flows.get(pending).map(|flow| flow.state))
    }

    pub fn pending_requests(&self) -> Result<Vec<PendingSessionRequest>, PortError> {
        let flows = self.lock_flows()?;
        let mut out: Vec<_> = flows.keys().cloned().collect();
        out.sort_by(|a, b| (a.id, &a.topic).cmp(&(b.id, &b.topic)));
        Ok(out)
    }

    fn resolve(&self, pending: &PendingSessionRequest, response: Response<'_>) -> Result<(), PortError> {
        self.ledger.claim(pending)?;
        match response {
            Response::Success(result) => self.sessions.respond_success(pending, result),
            Response::Error(error) => self.sessions.respond_error(pending, error),
        }
    }

    fn lock_flows(&self) -> Result<MutexGuard<'_, FlowTable>, PortError> {
        self.flows
            .lock()
            .map_err(|e| PortError::Transport(format!("flow table lock poisoned: {e}")))
    }
}

impl<D, S, W, T> Drop for SigningCoordinator<D, S, W, T>
where
    D: TxDecoderPort,
    S: TxSignerPort,
    W: SessionResponsePort,
    T: TelemetryPort,
{
    fn drop(&mut self) {
        let flows = match self.flows.get_mut() {
            Ok(flows) => std::mem::take(flows),
            Err(poisoned) => std::mem::take(poisoned.into_inner()),
        };
        for (pending, flow) in flows {
            warn!(
                request_id = pending.id,
                topic = %pending.topic,
                state = ?flow.state,
                "rejecting unresolved request on shutdown"
            );
            if let Err(e) = self.resolve(&pending, Response::Error(&SessionError::user_rejected())) {
                warn!(request_id = pending.id, error = %e, "failed to reject unresolved request");
            }
        }
    }
}

fn is_current(flow: &SigningFlow, generation: u64) -> bool {
    flow.generation == generation && flow.state == SigningState::Decoding
}

fn not_found(pending: &PendingSessionRequest) -> PortError {
    PortError::NotFound(format!(
        "no signing flow for request {} on topic {}",
        pending.id, pending.topic
    ))
}
