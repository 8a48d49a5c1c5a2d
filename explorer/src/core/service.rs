//! # Service Traits
//!
//! Capability traits for the explorer's external collaborators, so the state
//! machine can run against the live trends API and statistics engine or
//! against in-process fakes.

use async_trait::async_trait;
use shared::dto::trends::{Filter, GraphAverages, RawGraph, TermSeries, TopQueries};

use super::error::Result;

/// Trends API operations.
#[async_trait]
pub trait TrendsService: Send + Sync {
    /// Raw interest series for every term of `filter`, in term order.
    async fn get_graph(&self, filter: &Filter) -> Result<RawGraph>;

    /// Top related queries for the term at `start_index`.
    async fn get_top_queries(&self, filter: &Filter, start_index: usize) -> Result<TopQueries>;

    /// Average interest of each term of `filter` over the same window.
    async fn get_graph_averages(&self, filter: &Filter) -> Result<GraphAverages>;
}

/// A stateful, single-session decomposition engine.
///
/// Implementations are NOT required to tolerate concurrent calls; the
/// [`crate::services::decomposition::DecompositionChannel`] serializes them.
#[async_trait]
pub trait DecompositionEngine: Send + Sync {
    /// Send one serialized raw series and return the engine's text response.
    async fn round_trip(&self, payload: String) -> Result<String>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Chart collaborator: renders an ordered list of per-term series.
pub trait ChartSink: Send + Sync {
    fn update_data(&self, series: &[TermSeries]);

    /// Hide transient visual state (tooltips, hover markers).
    fn hide(&self);
}
