//! # Chart Sync
//!
//! Decides when accumulated series reach the chart collaborators. The gate is
//! evaluated and `is_changing` cleared inside one write-lock scope; the charts
//! are called after the lock is released.

use std::sync::Arc;

use parking_lot::RwLock;
use shared::dto::trends::TermSeries;
use tracing::debug;

use super::state::ExploreState;
use crate::core::service::ChartSink;

#[derive(Clone)]
pub struct ChartSync {
    seasonal_chart: Arc<dyn ChartSink>,
    /// Shows trends when split, raw totals when merged
    trend_chart: Arc<dyn ChartSink>,
}

impl ChartSync {
    pub fn new(seasonal_chart: Arc<dyn ChartSink>, trend_chart: Arc<dyn ChartSink>) -> Self {
        Self {
            seasonal_chart,
            trend_chart,
        }
    }

    /// Push ready data if anything changed. Returns whether the charts were updated.
    pub fn update_elements(&self, state: &RwLock<ExploreState>) -> bool {
        let payload: Option<(Vec<TermSeries>, Vec<TermSeries>)> = {
            let mut state = state.write();
            let ready = state.is_changing
                && !state.is_loading
                && state.decomposition_complete()
                && !state.seasonal().is_empty()
                && !state.trend().is_empty()
                && !state.total().is_empty();

            if ready {
                let seasonal = state.seasonal().to_vec();
                let secondary = if state.is_merged {
                    state.total().to_vec()
                } else {
                    state.trend().to_vec()
                };
                state.is_changing = false;
                Some((seasonal, secondary))
            } else {
                None
            }
        };

        match payload {
            Some((seasonal, secondary)) => {
                debug!(terms = seasonal.len(), "Pushing series to charts");
                self.seasonal_chart.update_data(&seasonal);
                self.trend_chart.update_data(&secondary);
                true
            }
            None => false,
        }
    }

    /// Flip between trend and raw-total display on the secondary chart.
    ///
    /// Returns the new merge mode.
    pub fn toggle_merge(&self, state: &RwLock<ExploreState>) -> bool {
        let merged = {
            let mut state = state.write();
            state.is_merged = !state.is_merged;
            state.is_changing = true;
            state.is_merged
        };
        self.trend_chart.hide();
        self.update_elements(state);
        merged
    }

    /// Caption for the merge toggle.
    pub fn merge_label(is_merged: bool) -> &'static str {
        if is_merged {
            "Split Charts"
        } else {
            "Merge Charts"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::recording::RecordingChart;
    use shared::dto::trends::{Filter, Geo, SeriesPoint, Term};

    fn series(term: &str, value: f64) -> TermSeries {
        TermSeries {
            term: term.to_string(),
            points: vec![SeriesPoint::new("2017-01-01", value)],
        }
    }

    fn ready_state() -> RwLock<ExploreState> {
        let mut state = ExploreState::new(Geo::new("US", "United States"), 3);
        state.begin_run(Filter {
            terms: vec![Term::new("/m/cold", "Cold")],
            geo: Geo::new("US", "United States"),
        });
        let run = state.run.as_mut().unwrap();
        run.raw = vec![series("Cold", 40.0)];
        run.series
            .push_decomposition(series("Cold", 1.5), series("Cold", 38.0))
            .unwrap();
        state.is_loading = false;
        RwLock::new(state)
    }

    fn sync() -> (ChartSync, Arc<RecordingChart>, Arc<RecordingChart>) {
        let seasonal = Arc::new(RecordingChart::default());
        let trend = Arc::new(RecordingChart::default());
        (ChartSync::new(seasonal.clone(), trend.clone()), seasonal, trend)
    }

    // ========== Gate Tests ==========

    #[test]
    fn test_update_pushes_once_then_noops() {
        let (sync, seasonal, trend) = sync();
        let state = ready_state();

        assert!(sync.update_elements(&state));
        assert!(!sync.update_elements(&state));

        assert_eq!(seasonal.updates().len(), 1);
        assert_eq!(trend.updates()[0][0].points[0].value, 38.0);
        assert!(!state.read().is_changing);
    }

    #[test]
    fn test_update_waits_while_loading() {
        let (sync, seasonal, _) = sync();
        let state = ready_state();
        state.write().is_loading = true;

        assert!(!sync.update_elements(&state));
        assert!(seasonal.updates().is_empty());
        assert!(state.read().is_changing);
    }

    #[test]
    fn test_update_never_shows_partial_decomposition() {
        let (sync, seasonal, _) = sync();
        let mut state = ExploreState::new(Geo::new("US", "United States"), 3);
        state.begin_run(Filter {
            terms: vec![Term::new("/m/cold", "Cold"), Term::new("/m/burn", "Burn")],
            geo: Geo::new("US", "United States"),
        });
        let run = state.run.as_mut().unwrap();
        run.raw = vec![series("Cold", 40.0), series("Burn", 10.0)];
        run.series
            .push_decomposition(series("Cold", 1.5), series("Cold", 38.0))
            .unwrap();
        state.is_loading = false;
        let state = RwLock::new(state);

        assert!(!sync.update_elements(&state));
        assert!(seasonal.updates().is_empty());
    }

    // ========== Merge Tests ==========

    #[test]
    fn test_toggle_merge_switches_secondary_to_totals() {
        let (sync, _, trend) = sync();
        let state = ready_state();
        sync.update_elements(&state);

        assert!(sync.toggle_merge(&state));
        assert_eq!(trend.hide_count(), 1);
        assert_eq!(trend.updates().last().unwrap()[0].points[0].value, 40.0);
        assert_eq!(ChartSync::merge_label(true), "Split Charts");

        assert!(!sync.toggle_merge(&state));
        assert_eq!(trend.updates().last().unwrap()[0].points[0].value, 38.0);
        assert_eq!(ChartSync::merge_label(false), "Merge Charts");
    }
}
