//! Keyed cancellation scope

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Issues independent tokens per key.
///
/// Superseding one key leaves the others alone, so unrelated loads owned by
/// the same consumer do not cancel each other.
pub struct KeyedCancelScope<K = String> {
    root: CancellationToken,
    tokens: Mutex<HashMap<K, CancellationToken>>,
}

impl<K> Default for KeyedCancelScope<K> {
    fn default() -> Self {
        Self { root: CancellationToken::new(), tokens: Mutex::new(HashMap::new()) }
    }
}

impl<K> KeyedCancelScope<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede the token held under `key` and issue a fresh one.
    pub fn token(&self, key: impl Into<K>) -> CancellationToken {
        let mut tokens = self.tokens.lock();
        let token = self.root.child_token();
        if let Some(previous) = tokens.insert(key.into(), token.clone()) {
            trace!("superseding previous keyed request token");
            previous.cancel();
        }
        token
    }

    /// Cancel the token held under `key`. Returns whether one was held.
    pub fn cancel<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match self.tokens.lock().remove(key) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every outstanding token; the scope stays usable.
    pub fn cancel_all(&self) {
        for (_, token) in self.tokens.lock().drain() {
            token.cancel();
        }
    }

    /// Whether a live token is held under `key`.
    pub fn is_active<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.tokens.lock().get(key).is_some_and(|token| !token.is_cancelled())
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.lock().is_empty()
    }
}

impl<K> KeyedCancelScope<K> {
    /// Cancel everything this scope issued and refuse live tokens from now on.
    pub fn dispose(&self) {
        let mut tokens = self.tokens.lock();
        self.root.cancel();
        tokens.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.root.is_cancelled()
    }
}

impl<K> Drop for KeyedCancelScope<K> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<K> fmt::Debug for KeyedCancelScope<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedCancelScope")
            .field("disposed", &self.is_disposed())
            .field("tokens", &self.tokens.lock().len())
            .finish()
    }
}
