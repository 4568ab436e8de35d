//! Client-side session state port.

use pitwall_domain::UserProfile;

/// Client-side record of who is signed in.
///
/// The backend session cookie is the source of truth; this store only keeps
/// the UI from showing "signed in" chrome after the backend has said
/// otherwise.
pub trait SessionStore: Send + Sync {
    /// Remember the profile of the signed-in account.
    fn set_user(&self, user: UserProfile);

    /// The profile last recorded, if any.
    fn current_user(&self) -> Option<UserProfile>;

    /// Forget the signed-in account.
    fn clear(&self);

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}
