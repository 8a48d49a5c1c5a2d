//! # Explorer State Machine
//!
//! Drives one pipeline run per confirmed filter:
//!
//! ```text
//! confirm ─► FetchingRaw ─► Decomposing(0..k) ─► FetchingTopQueries(0..k) ─► Ready
//!                 │                │                       │
//!                 └────────────────┴───────────────────────┴──► Failed
//! ```
//!
//! Round trips run as spawned tasks and report back as [`ExploreEvent`]s over
//! an `async_channel`. Only the event handler mutates pipeline state. A new
//! confirm always starts a new generation; events from older generations are
//! dropped on arrival.
//!
//! ## Module Structure
//!
//! ```text
//! app/
//! ├── mod.rs           - Explorer struct and user operations
//! ├── accumulator.rs   - SeriesAccumulator (per-run ordered results)
//! ├── chart_sync.rs    - ChartSync (gated push to chart collaborators)
//! ├── event_handler.rs - Applies ExploreEvents, issues follow-up requests
//! ├── events.rs        - ExploreEvent
//! ├── filter.rs        - FilterState (pending vs. confirmed selection)
//! ├── ranking.rs       - Sequential averages comparison over the catalog
//! ├── state.rs         - ExploreState, PipelineRun, Phase
//! └── tasks/           - Spawned round trips
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_channel::{Receiver, Sender};
use parking_lot::RwLock;
use shared::dto::trends::{Filter, Geo, Term};
use tracing::{debug, info};

pub mod accumulator;
pub mod chart_sync;
pub mod event_handler;
pub mod events;
pub mod filter;
pub mod ranking;
pub mod state;
pub(crate) mod tasks;

pub use accumulator::SeriesAccumulator;
pub use chart_sync::ChartSync;
pub use events::ExploreEvent;
pub use filter::{FilterState, DEFAULT_MAX_TERMS};
pub use state::{ExploreState, Phase, PipelineRun};

use crate::core::error::{ExploreError, Result};
use crate::core::service::TrendsService;
use crate::services::decomposition::DecompositionChannel;
use event_handler::ExploreEventHandler;

/// Tunables shared by every run.
#[derive(Debug, Clone)]
pub struct ExplorerSettings {
    /// Upper bound for each trends API round trip
    pub round_trip_timeout: Duration,
    pub max_terms: usize,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            round_trip_timeout: Duration::from_secs(10),
            max_terms: DEFAULT_MAX_TERMS,
        }
    }
}

pub struct Explorer {
    pub state: Arc<RwLock<ExploreState>>,
    event_tx: Sender<ExploreEvent>,
    event_rx: Receiver<ExploreEvent>,
    trends: Arc<dyn TrendsService>,
    channel: DecompositionChannel,
    charts: ChartSync,
    settings: ExplorerSettings,
}

impl Explorer {
    pub fn new(
        trends: Arc<dyn TrendsService>,
        channel: DecompositionChannel,
        charts: ChartSync,
        default_geo: Geo,
        settings: ExplorerSettings,
    ) -> Self {
        let (event_tx, event_rx) = async_channel::unbounded();
        let state = ExploreState::new(default_geo, settings.max_terms);

        Self {
            state: Arc::new(RwLock::new(state)),
            event_tx,
            event_rx,
            trends,
            channel,
            charts,
            settings,
        }
    }

    pub fn channel(&self) -> &DecompositionChannel {
        &self.channel
    }

    pub fn select_terms(&self, terms: Vec<Term>) -> Result<()> {
        self.state.write().filter.select_terms(terms)
    }

    pub fn select_geo(&self, geo: Geo) {
        self.state.write().filter.select_geo(geo);
    }

    pub fn cancel(&self) {
        self.state.write().filter.cancel();
    }

    /// Promote the pending selection and start a run. Returns its generation.
    pub fn confirm(&self) -> Result<u64> {
        let (generation, filter) = {
            let mut state = self.state.write();
            let filter = state.filter.confirm()?;
            (state.begin_run(filter.clone()), filter)
        };
        self.start_run(generation, filter);
        Ok(generation)
    }

    /// Open a curated filter directly, bypassing the pending stage.
    pub fn load_curated(&self, filter: Filter) -> Result<u64> {
        let generation = {
            let mut state = self.state.write();
            state.filter.load(&filter)?;
            state.begin_run(filter.clone())
        };
        self.start_run(generation, filter);
        Ok(generation)
    }

    fn start_run(&self, generation: u64, filter: Filter) {
        info!(
            generation,
            terms = %shared::utils::join_term_names(&filter.terms),
            geo = %filter.geo.iso,
            "Starting pipeline run"
        );
        tasks::trends::fetch_graph(
            self.trends.clone(),
            filter,
            generation,
            self.settings.round_trip_timeout,
            self.event_tx.clone(),
        );
    }

    /// Flip the secondary chart between trends and raw totals.
    pub fn toggle_merge(&self) -> bool {
        self.charts.toggle_merge(&self.state)
    }

    /// Caption for the merge toggle in the current mode.
    pub fn merge_label(&self) -> &'static str {
        ChartSync::merge_label(self.state.read().is_merged)
    }

    pub fn handle_event(&self, event: ExploreEvent) {
        self.handle_event_impl(event);
    }

    /// Drain queued events without waiting. Returns how many were handled.
    pub fn on_tick(&self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Handle events until the current run is `Ready` or `Failed`.
    pub async fn run_until_settled(&self) -> Result<Phase> {
        loop {
            let phase = self.state.read().phase;
            if phase.is_settled() {
                debug!(phase = %phase.label(), "Run settled");
                return Ok(phase);
            }
            let event = self
                .event_rx
                .recv()
                .await
                .map_err(|_| ExploreError::State("event channel closed".to_string()))?;
            self.handle_event(event);
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.read().phase
    }

    /// Clone of the current state for read-only inspection.
    pub fn snapshot(&self) -> ExploreState {
        self.state.read().clone()
    }
}
