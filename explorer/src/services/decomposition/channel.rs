//! # Decomposition Channel
//!
//! Single-flight wrapper around a [`DecompositionEngine`]. The engine keeps a
//! session per connection and corrupts it if two requests interleave, so every
//! round trip holds an async mutex for its whole duration. Later callers queue
//! on the mutex in FIFO order.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shared::dto::trends::TermSeries;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::codec::{self, Decomposition};
use crate::core::error::{ExploreError, Result};
use crate::core::service::DecompositionEngine;

struct ChannelInner {
    engine: Arc<dyn DecompositionEngine>,
    gate: Mutex<()>,
    timeout: Duration,
    outstanding: AtomicUsize,
    peak_outstanding: AtomicUsize,
    completed: AtomicU64,
}

/// Decrements the outstanding counter even when the round trip future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Cloneable handle; all clones share one gate.
#[derive(Clone)]
pub struct DecompositionChannel {
    inner: Arc<ChannelInner>,
}

impl DecompositionChannel {
    pub fn new(engine: Arc<dyn DecompositionEngine>, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                engine,
                gate: Mutex::new(()),
                timeout,
                outstanding: AtomicUsize::new(0),
                peak_outstanding: AtomicUsize::new(0),
                completed: AtomicU64::new(0),
            }),
        }
    }

    /// Round-trip one term's raw series and decode the result.
    ///
    /// Waits for any earlier request to resolve first. A round trip that
    /// exceeds the configured timeout is a network failure.
    pub async fn request_decomposition(&self, raw: &TermSeries) -> Result<Decomposition> {
        let payload = codec::encode_request(&raw.points);
        let inner = &self.inner;

        let text = {
            let _permit = inner.gate.lock().await;
            let in_flight = inner.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
            let _in_flight = InFlight(&inner.outstanding);
            inner.peak_outstanding.fetch_max(in_flight, Ordering::SeqCst);

            debug!(
                engine = inner.engine.name(),
                term = %raw.term,
                points = raw.points.len(),
                "Sending series to decomposition engine"
            );

            let start = std::time::Instant::now();
            let response = tokio::time::timeout(inner.timeout, inner.engine.round_trip(payload)).await;
            let duration = start.elapsed();

            match response {
                Ok(Ok(text)) => {
                    inner.completed.fetch_add(1, Ordering::SeqCst);
                    debug!(
                        term = %raw.term,
                        response_len = text.len(),
                        duration_ms = duration.as_millis(),
                        "Decomposition response received"
                    );
                    text
                }
                Ok(Err(e)) => {
                    warn!(term = %raw.term, error = %e, "Decomposition round trip failed");
                    return Err(e);
                }
                Err(_) => {
                    warn!(
                        term = %raw.term,
                        timeout_ms = inner.timeout.as_millis(),
                        "Decomposition round trip timed out"
                    );
                    return Err(ExploreError::Network(format!(
                        "decomposition engine did not answer within {} ms",
                        inner.timeout.as_millis()
                    )));
                }
            }
        };

        codec::decode_response(&text, &raw.points)
    }

    /// Requests currently holding the gate (0 or 1).
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously outstanding requests ever observed.
    pub fn peak_outstanding(&self) -> usize {
        self.inner.peak_outstanding.load(Ordering::SeqCst)
    }

    /// Successful round trips so far.
    pub fn completed(&self) -> u64 {
        self.inner.completed.load(Ordering::SeqCst)
    }

    pub fn engine_name(&self) -> &'static str {
        self.inner.engine.name()
    }
}
