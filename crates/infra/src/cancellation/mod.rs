//! Cancellation scopes
//!
//! A scope is owned by one consumer (a view, a background job) and issues
//! `CancellationToken`s for the requests it starts. Disposing the scope, or
//! dropping it, cancels every token it issued; tokens issued afterwards are
//! born cancelled.
//!
//! The transport checks a token before sending and races the in-flight call
//! against it, so cancelling aborts the underlying HTTP exchange instead of
//! merely discarding its result.

pub mod keyed;
pub mod scope;

use std::future::Future;

pub use keyed::KeyedCancelScope;
pub use scope::CancelScope;
pub use tokio_util::sync::CancellationToken;

use crate::api::errors::ApiError;

/// Drive `work` until it finishes or `cancel` fires, whichever comes first.
///
/// Losing the race drops `work`, which aborts any I/O it owns.
pub(crate) async fn run_cancellable<T, F>(
    cancel: Option<&CancellationToken>,
    work: F,
) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                () = token.cancelled() => Err(ApiError::Cancelled),
                result = work => result,
            }
        }
        None => work.await,
    }
}
