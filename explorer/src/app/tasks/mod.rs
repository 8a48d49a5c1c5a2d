//! # Async Tasks
//!
//! Round trips spawned by the state machine. Each task performs exactly one
//! request and reports back through the event channel; none touch state.

use std::future::Future;
use std::time::Duration;

use crate::core::error::{ExploreError, Result};

pub mod decomposition;
pub mod trends;

/// Bound `request` by `timeout`; expiry is a network failure.
pub(crate) async fn with_timeout<T>(
    timeout: Duration,
    what: &str,
    request: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, request).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(request = what, timeout_ms = timeout.as_millis(), "Request timed out");
            Err(ExploreError::Network(format!(
                "{} did not complete within {} ms",
                what,
                timeout.as_millis()
            )))
        }
    }
}
