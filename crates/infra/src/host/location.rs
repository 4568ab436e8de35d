//! Observable in-memory location

use pitwall_core::Navigator;
use tokio::sync::watch;
use tracing::debug;

/// Current path plus a watch channel announcing whole-page navigations.
///
/// The shell subscribes and reloads its UI whenever a redirect arrives.
#[derive(Debug)]
pub struct LocationState {
    sender: watch::Sender<String>,
}

impl LocationState {
    pub fn new(initial_path: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(initial_path.into());
        Self { sender }
    }

    /// Move to `path` inside the application (no page load).
    pub fn set_path(&self, path: impl Into<String>) {
        self.sender.send_replace(path.into());
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.sender.subscribe()
    }
}

impl Default for LocationState {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for LocationState {
    fn current_path(&self) -> String {
        let current = self.sender.borrow();
        let path = current.split(['?', '#']).next().unwrap_or_default();
        path.to_string()
    }

    fn redirect(&self, path: &str) {
        debug!(%path, "full-page navigation");
        self.sender.send_replace(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_path_drops_query_and_fragment() {
        let location = LocationState::new("/leagues?page=2#top");
        assert_eq!(location.current_path(), "/leagues");
    }

    #[tokio::test]
    async fn redirect_notifies_subscribers() {
        let location = LocationState::new("/leagues");
        let mut receiver = location.subscribe();

        location.redirect("/login");

        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), "/login");
        assert_eq!(location.current_path(), "/login");
    }

    #[test]
    fn set_path_without_subscribers_still_updates() {
        let location = LocationState::default();
        location.set_path("/drivers");
        assert_eq!(location.current_path(), "/drivers");
    }
}
