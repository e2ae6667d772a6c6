use std::sync::{Arc, Condvar, Mutex};

use wc_signer_core::PortError;

/// Caps the number of node requests in flight.
#[derive(Debug, Clone)]
pub struct RequestThrottle {
    limit: usize,
    inner: Arc<(Mutex<usize>, Condvar)>,
}

impl RequestThrottle {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            inner: Arc::new((Mutex::new(0), Condvar::new())),
        }
    }

    /// Blocks until a slot is free. The slot is released when the permit drops.
    pub fn acquire(&self) -> Result<ThrottlePermit, PortError> {
        let (lock, cvar) = &*self.inner;
        let g = lock
            .lock()
            .map_err(|e| PortError::Transport(format!("throttle lock poisoned: {e}")))?;
        let mut g = cvar
            .wait_while(g, |in_flight| *in_flight >= self.limit)
            .map_err(|e| PortError::Transport(format!("throttle lock poisoned: {e}")))?;
        *g += 1;
        Ok(ThrottlePermit {
            inner: Arc::clone(&self.inner),
        })
    }

    pub fn in_flight(&self) -> Result<usize, PortError> {
        let (lock, _) = &*self.inner;
        let g = lock
            .lock()
            .map_err(|e| PortError::Transport(format!("throttle lock poisoned: {e}")))?;
        Ok(*g)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[derive(Debug)]
pub struct ThrottlePermit {
    inner: Arc<(Mutex<usize>, Condvar)>,
}

impl Drop for ThrottlePermit {
    fn drop(&mut self) {
        let (lock, cvar) = &*self.inner;
        let mut g = match lock.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *g = g.saturating_sub(1);
        cvar.notify_one();
    }
}
