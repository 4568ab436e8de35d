//! Resource services
//!
//! One service per resource domain. Every method performs exactly one
//! transport call, strips the envelope and settles the outcome:
//!
//! - `Ok(Some(value))`: success
//! - `Ok(None)`: the request was cancelled
//! - `Err(ClassifiedError)`: any other failure, classified once
//!
//! Services hold no mutable state of their own and do no business-rule
//! validation.

pub mod driver;
pub mod league;
pub mod user;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub use driver::DriverService;
pub use league::LeagueService;
pub use user::UserService;

use crate::api::{settle, ApiClient, ApiError, ClassifiedError};
use crate::http::ApiRequest;

/// Send `request`, unwrap the body and settle the result for `operation`.
async fn call<T, F>(
    client: &ApiClient,
    operation: &str,
    request: Result<ApiRequest, ApiError>,
    cancel: Option<&CancellationToken>,
    unwrap: F,
) -> Result<Option<T>, ClassifiedError>
where
    F: FnOnce(Value) -> Result<T, ApiError>,
{
    let result = match request {
        Ok(request) => client.send(request, cancel).await.and_then(unwrap),
        Err(err) => Err(err),
    };
    settle(operation, result)
}
