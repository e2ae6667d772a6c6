use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use crate::domain::PendingSessionRequest;
use crate::ports::PortError;

pub const DEFAULT_LEDGER_RETENTION: usize = 4_096;

/// Records which session requests already received their single response.
/// Keeps the most recent `retention` handles; older ones are forgotten first.
#[derive(Debug)]
pub struct ResponseLedger {
    retention: usize,
    inner: Mutex<LedgerState>,
}

#[derive(Debug, Default)]
struct LedgerState {
    resolved: HashSet<PendingSessionRequest>,
    order: VecDeque<PendingSessionRequest>,
}

impl Default for ResponseLedger {
    fn default() -> Self {
        Self::with_retention(DEFAULT_LEDGER_RETENTION)
    }
}

impl ResponseLedger {
    pub fn with_retention(retention: usize) -> Self {
        Self {
            retention: retention.max(1),
            inner: Mutex::new(LedgerState::default()),
        }
    }

    /// Claims the one response slot of `request`. Fails if it was taken before.
    pub fn claim(&self, request: &PendingSessionRequest) -> Result<(), PortError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("ledger lock poisoned: {e}")))?;
        if !g.resolved.insert(request.clone()) {
            return Err(PortError::AlreadyResolved(format!(
                "request {} on topic {}",
                request.id, request.topic
            )));
        }
        g.order.push_back(request.clone());
        while g.order.len() > self.retention {
            if let Some(oldest) = g.order.pop_front() {
                g.resolved.remove(&oldest);
            }
        }
        Ok(())
    }

    pub fn is_resolved(&self, request: &PendingSessionRequest) -> Result<bool, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("ledger lock poisoned: {e}")))?;
        Ok(g.resolved.contains(request))
    }

    pub fn resolved_count(&self) -> Result<usize, PortError> {
        let g = self
            .inner
            .lock()
            .map_err(|e| PortError::Transport(format!("ledger lock poisoned: {e}")))?;
        Ok(g.resolved.len())
    }

    pub fn retention(&self) -> usize {
        self.retention
    }
}
