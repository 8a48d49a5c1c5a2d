//! # Ranking
//!
//! Compares one anchor term against a list of candidates by average interest,
//! one `get_graph_averages` call at a time with a pause in between. Stops at
//! the first failure and reports what it collected so far.

use std::sync::Arc;
use std::time::Duration;

use shared::dto::trends::{Filter, Geo, Term};
use tracing::{info, warn};

use super::tasks::with_timeout;
use crate::core::error::{ExploreError, Result};
use crate::core::service::TrendsService;

/// Pause between comparisons.
pub const DEFAULT_RANKING_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct RankingRow {
    pub anchor_value: f64,
    pub other_value: f64,
    pub other: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingReport {
    pub rows: Vec<RankingRow>,
    /// Why the run stopped early, if it did
    pub error: Option<String>,
}

impl RankingReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

pub struct RankingRun {
    trends: Arc<dyn TrendsService>,
    anchor: Term,
    geo: Geo,
    delay: Duration,
    timeout: Duration,
}

impl RankingRun {
    pub fn new(trends: Arc<dyn TrendsService>, anchor: Term, geo: Geo) -> Self {
        Self {
            trends,
            anchor,
            geo,
            delay: DEFAULT_RANKING_DELAY,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn compare(&self, other: &Term) -> Result<RankingRow> {
        let filter = Filter {
            terms: vec![self.anchor.clone(), other.clone()],
            geo: self.geo.clone(),
        };
        let response = with_timeout(
            self.timeout,
            "averages fetch",
            self.trends.get_graph_averages(&filter),
        )
        .await?;

        match response.averages.as_slice() {
            [anchor, other_avg, ..] => Ok(RankingRow {
                anchor_value: anchor.value,
                other_value: other_avg.value,
                other: other.name.clone(),
            }),
            _ => Err(ExploreError::Protocol(format!(
                "averages for {} returned {} entries, expected 2",
                other.name,
                response.averages.len()
            ))),
        }
    }

    /// Compare the anchor against each candidate in order.
    pub async fn run(&self, candidates: &[Term]) -> RankingReport {
        let mut report = RankingReport::default();

        for (i, other) in candidates.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.compare(other).await {
                Ok(row) => {
                    info!(
                        anchor = %self.anchor.name,
                        anchor_value = row.anchor_value,
                        other = %row.other,
                        other_value = row.other_value,
                        "Ranking comparison"
                    );
                    report.rows.push(row);
                }
                Err(e) => {
                    warn!(other = %other.name, error = %e, "Ranking stopped");
                    report.error = Some(e.to_string());
                    break;
                }
            }
        }
        report
    }
}
