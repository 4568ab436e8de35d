//! Single-slot cancellation scope

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Issues one live token at a time.
///
/// Asking for a new token cancels the previous one, which gives "latest
/// request wins" semantics for searches and pagers.
#[derive(Debug, Default)]
pub struct CancelScope {
    root: CancellationToken,
    current: Mutex<Option<CancellationToken>>,
}

impl CancelScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede the outstanding token, if any, and issue a fresh one.
    ///
    /// After [`dispose`](Self::dispose) the returned token is already
    /// cancelled.
    pub fn token(&self) -> CancellationToken {
        let mut slot = self.current.lock();
        let token = self.root.child_token();
        if let Some(previous) = slot.replace(token.clone()) {
            trace!("superseding previous request token");
            previous.cancel();
        }
        token
    }

    /// Token issued last, if it has not been cancelled through this scope.
    pub fn current(&self) -> Option<CancellationToken> {
        self.current.lock().clone()
    }

    /// Cancel the outstanding token without issuing a new one.
    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().take() {
            token.cancel();
        }
    }

    /// Cancel everything this scope issued and refuse live tokens from now on.
    pub fn dispose(&self) {
        let mut slot = self.current.lock();
        self.root.cancel();
        *slot = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.root.is_cancelled()
    }
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        self.dispose();
    }
}
