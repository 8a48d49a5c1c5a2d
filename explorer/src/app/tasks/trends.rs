//! # Trends Tasks
//!
//! Raw graph and top-query fetches against the trends API.

use std::sync::Arc;
use std::time::Duration;

use async_channel::Sender;
use shared::dto::trends::Filter;
use tokio::spawn;
use tracing::{debug, warn};

use super::with_timeout;
use crate::app::events::ExploreEvent;
use crate::core::service::TrendsService;

/// Fetch the raw interest series for every term of `filter`.
pub(crate) fn fetch_graph(
    trends: Arc<dyn TrendsService>,
    filter: Filter,
    generation: u64,
    timeout: Duration,
    event_tx: Sender<ExploreEvent>,
) {
    spawn(async move {
        debug!(generation, terms = filter.terms.len(), geo = %filter.geo.iso, "Fetching raw graph");
        let result = with_timeout(timeout, "graph fetch", trends.get_graph(&filter)).await;

        if let Err(e) = &result {
            warn!(generation, error = %e, "Raw graph fetch failed");
        }
        if event_tx
            .send(ExploreEvent::GraphResult { generation, result })
            .await
            .is_err()
        {
            debug!(generation, "Event channel closed, dropping graph result");
        }
    });
}

/// Fetch top queries for the term at `index`.
pub(crate) fn fetch_top_queries(
    trends: Arc<dyn TrendsService>,
    filter: Filter,
    index: usize,
    generation: u64,
    timeout: Duration,
    event_tx: Sender<ExploreEvent>,
) {
    spawn(async move {
        debug!(generation, index, "Fetching top queries");
        let result = with_timeout(
            timeout,
            "top queries fetch",
            trends.get_top_queries(&filter, index),
        )
        .await;

        if let Err(e) = &result {
            warn!(generation, index, error = %e, "Top queries fetch failed");
        }
        if event_tx
            .send(ExploreEvent::TopQueriesResult {
                generation,
                index,
                result,
            })
            .await
            .is_err()
        {
            debug!(generation, index, "Event channel closed, dropping top queries result");
        }
    });
}
