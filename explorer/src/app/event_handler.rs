//! # Event Handler
//!
//! Applies round-trip results to [`ExploreState`] and issues the next request.
//!
//! Every handler follows the same shape: take the write lock, drop the event
//! if its generation is not current, apply it, decide the follow-up request,
//! release the lock, then spawn the follow-up and let [`ChartSync`] look at
//! the new state. Request `i + 1` is only ever issued from here, on receipt of
//! response `i`.
//!
//! [`ChartSync`]: crate::app::chart_sync::ChartSync

use shared::dto::trends::{Filter, RawGraph, TermSeries, TopQueries};
use tracing::{debug, error, info, warn};

use super::events::ExploreEvent;
use super::state::{ExploreState, Phase};
use super::tasks;
use super::Explorer;
use crate::core::error::{ExploreError, Result};
use crate::services::decomposition::Decomposition;

/// Follow-up request decided under the lock, spawned after it is released.
enum NextRequest {
    Decompose { raw: TermSeries, index: usize },
    TopQueries { filter: Filter, index: usize },
}

/// Trait for event handling implementation
pub(crate) trait ExploreEventHandler {
    fn handle_event_impl(&self, event: ExploreEvent);
}

impl ExploreEventHandler for Explorer {
    fn handle_event_impl(&self, event: ExploreEvent) {
        let generation = event.generation();
        debug!(event = event.kind(), generation, "Handling explorer event");

        let next = match event {
            ExploreEvent::GraphResult { generation, result } => {
                self.handle_graph_result(generation, result)
            }
            ExploreEvent::DecompositionResult {
                generation,
                index,
                result,
            } => self.handle_decomposition_result(generation, index, result),
            ExploreEvent::TopQueriesResult {
                generation,
                index,
                result,
            } => self.handle_top_queries_result(generation, index, result),
        };

        if let Some(next) = next {
            self.spawn_next(generation, next);
        }
        self.charts.update_elements(&self.state);
    }
}

/// Log and drop an event from a superseded run.
fn is_stale(state: &ExploreState, generation: u64, kind: &str) -> bool {
    if state.is_current(generation) {
        return false;
    }
    let stale = ExploreError::Stale {
        expected: state.generation,
        got: generation,
    };
    debug!(event = kind, error = %stale, "Dropping stale response");
    true
}

fn fail(state: &mut ExploreState, error: ExploreError) {
    error!(
        generation = state.generation,
        phase = %state.phase.label(),
        error = %error,
        "Pipeline run failed"
    );
    state.fail(&error);
}

impl Explorer {
    fn spawn_next(&self, generation: u64, next: NextRequest) {
        match next {
            NextRequest::Decompose { raw, index } => tasks::decomposition::request_decomposition(
                self.channel.clone(),
                raw,
                index,
                generation,
                self.event_tx.clone(),
            ),
            NextRequest::TopQueries { filter, index } => tasks::trends::fetch_top_queries(
                self.trends.clone(),
                filter,
                index,
                generation,
                self.settings.round_trip_timeout,
                self.event_tx.clone(),
            ),
        }
    }

    fn handle_graph_result(&self, generation: u64, result: Result<RawGraph>) -> Option<NextRequest> {
        let mut state = self.state.write();
        if is_stale(&state, generation, "GraphResult") {
            return None;
        }
        if state.phase != Phase::FetchingRaw {
            warn!(phase = %state.phase.label(), "Graph result outside raw fetch, ignoring");
            return None;
        }

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                fail(&mut state, e);
                return None;
            }
        };

        let Some(run) = state.run.as_mut() else {
            return None;
        };
        let term_count = run.filter.terms.len();
        if raw.len() != term_count {
            let e = ExploreError::Network(format!(
                "graph returned {} series for {} terms",
                raw.len(),
                term_count
            ));
            fail(&mut state, e);
            return None;
        }

        run.series = super::accumulator::SeriesAccumulator::new(term_count);
        run.raw = raw;
        let first = run.raw[0].clone();
        info!(
            generation,
            terms = term_count,
            points = first.points.len(),
            "Raw graph received, starting decomposition"
        );
        state.phase = Phase::Decomposing(0);

        Some(NextRequest::Decompose { raw: first, index: 0 })
    }

    fn handle_decomposition_result(
        &self,
        generation: u64,
        index: usize,
        result: Result<Decomposition>,
    ) -> Option<NextRequest> {
        let mut state = self.state.write();
        if is_stale(&state, generation, "DecompositionResult") {
            return None;
        }
        let expected = state.run.as_ref().map(|run| run.series.next_decomposition_index());
        if state.phase != Phase::Decomposing(index) || expected != Some(index) {
            warn!(
                index,
                ?expected,
                phase = %state.phase.label(),
                "Out-of-order decomposition result, ignoring"
            );
            return None;
        }

        let decomposition = match result {
            Ok(decomposition) => decomposition,
            Err(e) => {
                fail(&mut state, e);
                return None;
            }
        };

        let Some(run) = state.run.as_mut() else {
            return None;
        };
        let name = run.term_name(index).unwrap_or_default().to_string();
        let pushed = run.series.push_decomposition(
            TermSeries {
                term: name.clone(),
                points: decomposition.seasonal,
            },
            TermSeries {
                term: name.clone(),
                points: decomposition.trend,
            },
        );
        if let Err(e) = pushed {
            fail(&mut state, e);
            return None;
        }

        if run.series.decomposition_complete() {
            let filter = run.filter.clone();
            info!(generation, terms = filter.terms.len(), "Decomposition complete");
            state.is_loading = false;
            state.phase = Phase::FetchingTopQueries(0);
            Some(NextRequest::TopQueries { filter, index: 0 })
        } else {
            let next = index + 1;
            let raw = run.raw[next].clone();
            debug!(generation, term = %name, next, "Decomposition accumulated");
            state.phase = Phase::Decomposing(next);
            Some(NextRequest::Decompose { raw, index: next })
        }
    }

    fn handle_top_queries_result(
        &self,
        generation: u64,
        index: usize,
        result: Result<TopQueries>,
    ) -> Option<NextRequest> {
        let mut state = self.state.write();
        if is_stale(&state, generation, "TopQueriesResult") {
            return None;
        }
        let expected = state.run.as_ref().map(|run| run.series.next_top_queries_index());
        if state.phase != Phase::FetchingTopQueries(index) || expected != Some(index) {
            warn!(
                index,
                ?expected,
                phase = %state.phase.label(),
                "Out-of-order top queries result, ignoring"
            );
            return None;
        }

        let queries = match result {
            Ok(queries) => queries,
            Err(e) => {
                fail(&mut state, e);
                return None;
            }
        };

        let Some(run) = state.run.as_mut() else {
            return None;
        };
        if let Err(e) = run.series.push_top_queries(queries) {
            fail(&mut state, e);
            return None;
        }

        if run.series.top_queries_complete() {
            let elapsed_ms = (lib_utils::now_utc() - run.started_at).num_milliseconds();
            info!(generation, elapsed_ms, "Pipeline run ready");
            state.phase = Phase::Ready;
            None
        } else {
            let filter = run.filter.clone();
            state.phase = Phase::FetchingTopQueries(index + 1);
            Some(NextRequest::TopQueries {
                filter,
                index: index + 1,
            })
        }
    }
}
