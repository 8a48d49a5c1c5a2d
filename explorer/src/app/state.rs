//! # Explorer State
//!
//! Everything the event handler mutates, behind one `RwLock`.

use chrono::{DateTime, Utc};
use shared::dto::trends::{Filter, Geo, RawGraph, TermSeries};

use super::accumulator::SeriesAccumulator;
use super::filter::FilterState;
use crate::core::error::ExploreError;

/// Pipeline position of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FetchingRaw,
    /// Waiting on the decomposition of term `i`
    Decomposing(usize),
    /// Waiting on the top queries of term `i`
    FetchingTopQueries(usize),
    Ready,
    Failed,
}

impl Phase {
    /// No further events are expected for this run.
    pub fn is_settled(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Ready | Phase::Failed)
    }

    pub fn label(&self) -> String {
        match self {
            Phase::Idle => "idle".to_string(),
            Phase::FetchingRaw => "fetching raw series".to_string(),
            Phase::Decomposing(i) => format!("decomposing term {}", i + 1),
            Phase::FetchingTopQueries(i) => format!("fetching top queries for term {}", i + 1),
            Phase::Ready => "ready".to_string(),
            Phase::Failed => "failed".to_string(),
        }
    }
}

/// Data owned by one confirm. Only responses tagged with `generation` touch it.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub generation: u64,
    pub filter: Filter,
    pub started_at: DateTime<Utc>,
    pub raw: RawGraph,
    pub series: SeriesAccumulator,
}

impl PipelineRun {
    pub fn new(generation: u64, filter: Filter) -> Self {
        let term_count = filter.terms.len();
        Self {
            generation,
            filter,
            started_at: lib_utils::now_utc(),
            raw: Vec::new(),
            series: SeriesAccumulator::new(term_count),
        }
    }

    /// Display name of the term at `index`.
    pub fn term_name(&self, index: usize) -> Option<&str> {
        self.filter.terms.get(index).map(|t| t.name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ExploreState {
    pub filter: FilterState,
    /// Latest issued generation; 0 before the first confirm
    pub generation: u64,
    pub phase: Phase,
    pub run: Option<PipelineRun>,
    /// Raw fetch or decomposition in progress
    pub is_loading: bool,
    /// New data not yet pushed to the charts
    pub is_changing: bool,
    /// Secondary chart shows raw totals instead of trends
    pub is_merged: bool,
    pub last_error: Option<String>,
}

impl ExploreState {
    pub fn new(geo: Geo, max_terms: usize) -> Self {
        Self {
            filter: FilterState::new(geo, max_terms),
            generation: 0,
            phase: Phase::Idle,
            run: None,
            is_loading: false,
            is_changing: false,
            is_merged: false,
            last_error: None,
        }
    }

    /// Start a new run for `filter`, superseding any run in flight.
    pub fn begin_run(&mut self, filter: Filter) -> u64 {
        self.generation += 1;
        self.run = Some(PipelineRun::new(self.generation, filter));
        self.phase = Phase::FetchingRaw;
        self.is_loading = true;
        self.is_changing = true;
        self.last_error = None;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation && self.run.is_some()
    }

    /// Move to `Failed`. Partial accumulations are discarded.
    pub fn fail(&mut self, error: &ExploreError) {
        self.phase = Phase::Failed;
        self.is_loading = false;
        self.last_error = Some(error.to_string());
        if let Some(run) = self.run.as_mut() {
            if !run.series.decomposition_complete() {
                run.series.clear_decomposition();
            }
            if !run.series.top_queries_complete() {
                run.series.clear_top_queries();
            }
        }
    }

    pub fn decomposition_complete(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| run.series.decomposition_complete())
    }

    pub fn seasonal(&self) -> &[TermSeries] {
        self.run.as_ref().map(|r| r.series.seasonal()).unwrap_or(&[])
    }

    pub fn trend(&self) -> &[TermSeries] {
        self.run.as_ref().map(|r| r.series.trend()).unwrap_or(&[])
    }

    /// Raw series of the current run.
    pub fn total(&self) -> &[TermSeries] {
        self.run.as_ref().map(|r| r.raw.as_slice()).unwrap_or(&[])
    }

    /// `(term name, query titles)` for every term with at least one query.
    pub fn top_query_lists(&self) -> Vec<(String, Vec<String>)> {
        let Some(run) = self.run.as_ref() else {
            return Vec::new();
        };
        run.filter
            .terms
            .iter()
            .zip(run.series.top_queries())
            .filter(|(_, queries)| !queries.is_empty())
            .map(|(term, queries)| {
                (
                    term.name.clone(),
                    queries.item.iter().map(|q| q.title.clone()).collect(),
                )
            })
            .collect()
    }
}
