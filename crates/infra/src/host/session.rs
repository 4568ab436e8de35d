//! In-memory session store

use parking_lot::RwLock;
use pitwall_core::SessionStore;
use pitwall_domain::UserProfile;

#[derive(Debug, Default)]
pub struct InMemorySession {
    user: RwLock<Option<UserProfile>>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySession {
    fn set_user(&self, user: UserProfile) {
        *self.user.write() = Some(user);
    }

    fn current_user(&self) -> Option<UserProfile> {
        self.user.read().clone()
    }

    fn clear(&self) {
        *self.user.write() = None;
    }
}
