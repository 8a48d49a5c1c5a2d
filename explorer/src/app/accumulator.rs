//! # Series Accumulator
//!
//! Append-only per-run storage for decomposition and top-query results. Index
//! `i` in every collection belongs to `filter.terms[i]`.

use shared::dto::trends::{TermSeries, TopQueries};

use crate::core::error::{ExploreError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesAccumulator {
    term_count: usize,
    seasonal: Vec<TermSeries>,
    trend: Vec<TermSeries>,
    top_queries: Vec<TopQueries>,
}

impl SeriesAccumulator {
    pub fn new(term_count: usize) -> Self {
        Self {
            term_count,
            ..Self::default()
        }
    }

    pub fn term_count(&self) -> usize {
        self.term_count
    }

    /// Append one term's seasonal and trend series together.
    pub fn push_decomposition(&mut self, seasonal: TermSeries, trend: TermSeries) -> Result<()> {
        if self.decomposition_complete() {
            return Err(ExploreError::State(format!(
                "decomposition already holds {} of {} terms",
                self.seasonal.len(),
                self.term_count
            )));
        }
        self.seasonal.push(seasonal);
        self.trend.push(trend);
        Ok(())
    }

    /// Append one term's top queries. Only valid once decomposition is complete.
    pub fn push_top_queries(&mut self, queries: TopQueries) -> Result<()> {
        if !self.decomposition_complete() {
            return Err(ExploreError::State(
                "top queries arrived before decomposition completed".to_string(),
            ));
        }
        if self.top_queries_complete() {
            return Err(ExploreError::State(format!(
                "top queries already hold {} of {} terms",
                self.top_queries.len(),
                self.term_count
            )));
        }
        self.top_queries.push(queries);
        Ok(())
    }

    pub fn decomposition_complete(&self) -> bool {
        self.seasonal.len() == self.term_count
    }

    pub fn top_queries_complete(&self) -> bool {
        self.top_queries.len() == self.term_count
    }

    /// Index of the next term awaiting decomposition.
    pub fn next_decomposition_index(&self) -> usize {
        self.seasonal.len()
    }

    /// Index of the next term awaiting top queries.
    pub fn next_top_queries_index(&self) -> usize {
        self.top_queries.len()
    }

    pub fn seasonal(&self) -> &[TermSeries] {
        &self.seasonal
    }

    pub fn trend(&self) -> &[TermSeries] {
        &self.trend
    }

    pub fn top_queries(&self) -> &[TopQueries] {
        &self.top_queries
    }

    /// Drop partial decomposition results.
    pub fn clear_decomposition(&mut self) {
        self.seasonal.clear();
        self.trend.clear();
    }

    /// Drop partial top-query results.
    pub fn clear_top_queries(&mut self) {
        self.top_queries.clear();
    }
}
