//! # Fixture Engine
//!
//! Deterministic, offline stand-in for the statistics server. Two scripts:
//!
//! - **Canned**: replays a fixed list of response blobs in order, wrapping
//!   around (the development dataset works this way).
//! - **Echo**: derives a well-formed response from the request itself: the
//!   seasonal block is the first 13 points' deviation from the series mean,
//!   the trend is a trailing moving average.
//!
//! The engine also records how many round trips overlapped, which tests use
//! to check the single-flight discipline.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::codec::{SEASONAL_MARKER, SEASONAL_POINTS, TREND_MARKER};
use crate::core::error::{ExploreError, Result};
use crate::core::service::DecompositionEngine;

/// Trailing window for the echo trend.
const ECHO_TREND_WINDOW: usize = 4;

#[derive(Debug, Clone)]
enum FixtureScript {
    Canned(Vec<String>),
    Echo,
}

pub struct FixtureEngine {
    script: FixtureScript,
    latency: Duration,
    cursor: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FixtureEngine {
    fn with_script(script: FixtureScript) -> Self {
        Self {
            script,
            latency: Duration::ZERO,
            cursor: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replay `responses` in order, wrapping around.
    pub fn canned(responses: Vec<String>) -> Self {
        Self::with_script(FixtureScript::Canned(responses))
    }

    /// Derive each response from its request.
    pub fn echo() -> Self {
        Self::with_script(FixtureScript::Echo)
    }

    /// Load canned responses from a file, one non-empty line per response.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExploreError::Config(format!("cannot read fixture file {}: {}", path.display(), e))
        })?;
        let responses: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if responses.is_empty() {
            return Err(ExploreError::Config(format!(
                "fixture file {} has no responses",
                path.display()
            )));
        }
        Ok(Self::canned(responses))
    }

    /// Simulated round-trip latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Most round trips ever observed in progress at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Payloads received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn respond(&self, payload: &str) -> Result<String> {
        match &self.script {
            FixtureScript::Canned(responses) => {
                if responses.is_empty() {
                    return Err(ExploreError::Network("fixture has no canned responses".to_string()));
                }
                let index = self.cursor.fetch_add(1, Ordering::SeqCst) % responses.len();
                Ok(responses[index].clone())
            }
            FixtureScript::Echo => echo_response(payload),
        }
    }
}

/// Build a contract-conforming response from a `date,value` payload.
fn echo_response(payload: &str) -> Result<String> {
    let mut values = Vec::new();
    for line in payload.lines().filter(|l| !l.trim().is_empty()) {
        let (date, value) = line
            .split_once(',')
            .ok_or_else(|| ExploreError::Protocol(format!("fixture cannot split request line {:?}", line)))?;
        lib_utils::parse_date(date)
            .map_err(|e| ExploreError::Protocol(format!("fixture request date: {}", e)))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| ExploreError::Protocol(format!("fixture request value {:?}", value)))?;
        values.push(value);
    }
    if values.is_empty() {
        return Err(ExploreError::Protocol("fixture received an empty series".to_string()));
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let seasonal: Vec<String> = (0..SEASONAL_POINTS)
        .map(|i| format!("{:.4}", values[i % values.len()] - mean))
        .collect();
    let trend: Vec<String> = (0..values.len())
        .map(|i| {
            let window = &values[i.saturating_sub(ECHO_TREND_WINDOW - 1)..=i];
            format!("{:.4}", window.iter().sum::<f64>() / window.len() as f64)
        })
        .collect();

    Ok(format!(
        "{}{}{}{}",
        SEASONAL_MARKER,
        seasonal.join(","),
        TREND_MARKER,
        trend.join(",")
    ))
}

#[async_trait]
impl DecompositionEngine for FixtureEngine {
    async fn round_trip(&self, payload: String) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.requests.lock().push(payload.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.respond(&payload)
    }

    fn name(&self) -> &'static str {
        match self.script {
            FixtureScript::Canned(_) => "fixture-canned",
            FixtureScript::Echo => "fixture-echo",
        }
    }
}
