//! # Explorer Events
//!
//! Results sent back from spawned round-trip tasks to the event handler. Each
//! carries the generation of the run that issued it.

use shared::dto::trends::{RawGraph, TopQueries};

use crate::core::error::Result;
use crate::services::decomposition::Decomposition;

#[derive(Debug, Clone)]
pub enum ExploreEvent {
    /// Raw interest series for the whole filter
    GraphResult { generation: u64, result: Result<RawGraph> },
    /// Decomposition of the term at `index`
    DecompositionResult {
        generation: u64,
        index: usize,
        result: Result<Decomposition>,
    },
    /// Top queries of the term at `index`
    TopQueriesResult {
        generation: u64,
        index: usize,
        result: Result<TopQueries>,
    },
}

impl ExploreEvent {
    pub fn generation(&self) -> u64 {
        match self {
            ExploreEvent::GraphResult { generation, .. }
            | ExploreEvent::DecompositionResult { generation, .. }
            | ExploreEvent::TopQueriesResult { generation, .. } => *generation,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExploreEvent::GraphResult { .. } => "GraphResult",
            ExploreEvent::DecompositionResult { .. } => "DecompositionResult",
            ExploreEvent::TopQueriesResult { .. } => "TopQueriesResult",
        }
    }
}
