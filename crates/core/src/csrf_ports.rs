//! Page-embedded anti-forgery token port.

/// Source of the anti-forgery token rendered into the page at load time
/// (a `<meta name="csrf-token">` tag in a browser host).
///
/// The value is fixed for the lifetime of the page; it is consulted only when
/// the in-memory cache is empty and ranks above the cookie.
pub trait PageTokenSource: Send + Sync {
    /// The embedded token, or `None` when the page carries none.
    fn meta_token(&self) -> Option<String>;
}

/// A fixed token (or none), as captured from the page once.
impl PageTokenSource for Option<String> {
    fn meta_token(&self) -> Option<String> {
        self.clone()
    }
}
