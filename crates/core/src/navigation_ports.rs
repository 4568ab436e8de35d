//! Navigation port for the unauthenticated-session redirect.

/// Whole-page navigation as the host shell performs it.
///
/// `redirect` leaves the application entirely (a full page load in a
/// browser), which is different from moving between views inside it.
pub trait Navigator: Send + Sync {
    /// Path of the page currently displayed, without query or fragment.
    fn current_path(&self) -> String;

    /// Navigate the whole page to `path`.
    fn redirect(&self, path: &str);
}
