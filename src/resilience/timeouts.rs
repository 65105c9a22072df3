//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the wait for upstream response headers
//! - Map expiry to `GatewayError::UpstreamTimeout` (504)
//!
//! Connect timeouts live on the connector; see `http::upstream`. Dropping the
//! wrapped future on expiry cancels the upstream request and releases its
//! connection.

use std::future::Future;
use std::time::Duration;

use crate::error::GatewayError;

/// Run `fut` with a deadline.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::UpstreamTimeout),
    }
}
