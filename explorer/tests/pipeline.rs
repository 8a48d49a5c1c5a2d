//! End-to-end runs of the explorer state machine against a mock trends API,
//! the fixture decomposition engine and recording charts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use explorer::app::{ChartSync, ExploreEvent, Explorer, ExplorerSettings, Phase};
use explorer::core::error::{ExploreError, Result};
use explorer::core::service::TrendsService;
use explorer::services::decomposition::{Decomposition, DecompositionChannel, FixtureEngine};
use explorer::ui::RecordingChart;
use shared::dto::trends::{
    Filter, Geo, GraphAverages, RawGraph, SeriesPoint, Term, TermSeries, TopQueries, TopQuery,
};

const POINTS: usize = 20;

struct MockTrends {
    channel: DecompositionChannel,
    latency: Duration,
    fail_graph: bool,
    fail_top_queries_at: Option<usize>,
    top_calls: Mutex<Vec<usize>>,
    /// Channel completions observed when each top-queries call started
    completed_at_top_call: Mutex<Vec<u64>>,
    top_in_flight: AtomicUsize,
    top_max_in_flight: AtomicUsize,
}

impl MockTrends {
    fn new(channel: DecompositionChannel) -> Self {
        Self {
            channel,
            latency: Duration::from_millis(2),
            fail_graph: false,
            fail_top_queries_at: None,
            top_calls: Mutex::new(Vec::new()),
            completed_at_top_call: Mutex::new(Vec::new()),
            top_in_flight: AtomicUsize::new(0),
            top_max_in_flight: AtomicUsize::new(0),
        }
    }

    fn failing(channel: DecompositionChannel) -> Self {
        Self {
            fail_graph: true,
            ..Self::new(channel)
        }
    }

    fn failing_top_queries_at(channel: DecompositionChannel, index: usize) -> Self {
        Self {
            fail_top_queries_at: Some(index),
            ..Self::new(channel)
        }
    }
}

fn weekly_points(seed: usize) -> Vec<SeriesPoint> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 4).unwrap();
    (0..POINTS)
        .map(|i| {
            let date = start + chrono::Duration::days(7 * i as i64);
            SeriesPoint::new(lib_utils::format_date(date), (seed * 10 + i) as f64)
        })
        .collect()
}

#[async_trait]
impl TrendsService for MockTrends {
    async fn get_graph(&self, filter: &Filter) -> Result<RawGraph> {
        tokio::time::sleep(self.latency).await;
        if self.fail_graph {
            return Err(ExploreError::Network("Failed to fetch /api/trends/graph: 503".to_string()));
        }
        Ok(filter
            .terms
            .iter()
            .enumerate()
            .map(|(i, term)| TermSeries {
                term: term.name.clone(),
                points: weekly_points(i),
            })
            .collect())
    }

    async fn get_top_queries(&self, filter: &Filter, start_index: usize) -> Result<TopQueries> {
        let now = self.top_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.top_max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.top_calls.lock().push(start_index);
        self.completed_at_top_call.lock().push(self.channel.completed());

        tokio::time::sleep(self.latency).await;
        self.top_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_top_queries_at == Some(start_index) {
            return Err(ExploreError::Network("boom".to_string()));
        }

        Ok(TopQueries {
            item: vec![TopQuery {
                title: format!("{} symptoms", filter.terms[start_index].name.to_lowercase()),
                value: 100.0,
            }],
        })
    }

    async fn get_graph_averages(&self, _filter: &Filter) -> Result<GraphAverages> {
        Ok(GraphAverages { averages: Vec::new() })
    }
}

struct Harness {
    explorer: Explorer,
    trends: Arc<MockTrends>,
    engine: Arc<FixtureEngine>,
    seasonal_chart: Arc<RecordingChart>,
    trend_chart: Arc<RecordingChart>,
}

fn harness_with(engine: FixtureEngine, failing_graph: bool) -> Harness {
    let mock: fn(DecompositionChannel) -> MockTrends =
        if failing_graph { MockTrends::failing } else { MockTrends::new };
    build_harness(engine, Duration::from_secs(5), mock)
}

fn build_harness(
    engine: FixtureEngine,
    channel_timeout: Duration,
    mock: impl FnOnce(DecompositionChannel) -> MockTrends,
) -> Harness {
    let engine = Arc::new(engine);
    let channel = DecompositionChannel::new(engine.clone(), channel_timeout);
    let trends = Arc::new(mock(channel.clone()));
    let seasonal_chart = Arc::new(RecordingChart::default());
    let trend_chart = Arc::new(RecordingChart::default());

    let explorer = Explorer::new(
        trends.clone(),
        channel,
        ChartSync::new(seasonal_chart.clone(), trend_chart.clone()),
        Geo::new("US", "United States"),
        ExplorerSettings {
            round_trip_timeout: Duration::from_secs(5),
            max_terms: 10,
        },
    );

    Harness {
        explorer,
        trends,
        engine,
        seasonal_chart,
        trend_chart,
    }
}

fn harness() -> Harness {
    harness_with(FixtureEngine::echo().with_latency(Duration::from_millis(2)), false)
}

fn terms(names: &[&str]) -> Vec<Term> {
    names.iter().map(|n| Term::new(format!("/m/{}", n.to_lowercase()), *n)).collect()
}

fn numbered_terms(k: usize) -> Vec<Term> {
    (0..k).map(|i| Term::new(format!("/m/t{}", i), format!("Term {}", i))).collect()
}

/// Handle queued events until `done` holds for the current phase.
async fn pump_until(explorer: &Explorer, done: impl Fn(Phase) -> bool) {
    for _ in 0..500 {
        explorer.on_tick();
        if done(explorer.phase()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("phase never reached, stuck at {:?}", explorer.phase());
}

fn good_response() -> String {
    format!("seasonal:{}trend:{}", vec!["1.5"; 13].join(","), vec!["40"; POINTS].join(","))
}

// ========== Ready Run Tests ==========

#[tokio::test]
async fn test_ready_run_keeps_term_order_in_every_collection() {
    let h = harness();
    h.explorer.select_terms(terms(&["Influenza", "Cold", "Measles"])).unwrap();
    let generation = h.explorer.confirm().unwrap();
    assert_eq!(generation, 1);

    let phase = h.explorer.run_until_settled().await.unwrap();
    assert_eq!(phase, Phase::Ready);

    let state = h.explorer.snapshot();
    let run = state.run.as_ref().unwrap();
    let names: Vec<&str> = run.filter.terms.iter().map(|t| t.name.as_str()).collect();

    assert_eq!(state.seasonal().len(), 3);
    assert_eq!(state.trend().len(), 3);
    assert_eq!(run.series.top_queries().len(), 3);
    for (i, name) in names.iter().enumerate() {
        assert_eq!(state.seasonal()[i].term, *name);
        assert_eq!(state.trend()[i].term, *name);
        assert_eq!(state.seasonal()[i].points.len(), 13);
        assert_eq!(state.trend()[i].points.len(), POINTS);
        assert_eq!(run.series.top_queries()[i].item[0].title, format!("{} symptoms", name.to_lowercase()));
    }
    assert!(!state.is_loading);
    assert!(!state.is_changing);
    assert!(state.last_error.is_none());

    assert_eq!(h.seasonal_chart.updates().len(), 1);
    assert_eq!(h.trend_chart.updates().len(), 1);
    assert_eq!(h.trend_chart.updates()[0][2].term, "Measles");

    let lists = state.top_query_lists();
    assert_eq!(lists[0], ("Influenza".to_string(), vec!["influenza symptoms".to_string()]));
}

#[tokio::test]
async fn test_seasonal_points_reuse_raw_dates() {
    let h = harness();
    h.explorer.select_terms(terms(&["Cold"])).unwrap();
    h.explorer.confirm().unwrap();
    h.explorer.run_until_settled().await.unwrap();

    let state = h.explorer.snapshot();
    let raw = &state.total()[0].points;
    let seasonal = &state.seasonal()[0].points;
    assert_eq!(seasonal[0].date, raw[0].date);
    assert_eq!(seasonal[12].date, raw[12].date);
    assert_eq!(state.trend()[0].points[POINTS - 1].date, raw[POINTS - 1].date);
}

// ========== Single-Flight Tests ==========

#[tokio::test]
async fn test_channel_never_has_two_requests_outstanding() {
    for k in 1..=10 {
        let h = harness();
        h.explorer.select_terms(numbered_terms(k)).unwrap();
        h.explorer.confirm().unwrap();

        assert_eq!(h.explorer.run_until_settled().await.unwrap(), Phase::Ready, "k = {}", k);
        assert_eq!(h.explorer.channel().peak_outstanding(), 1, "k = {}", k);
        assert_eq!(h.engine.max_concurrent(), 1, "k = {}", k);
        assert_eq!(h.explorer.channel().completed(), k as u64);
    }
}

#[tokio::test]
async fn test_top_queries_start_after_decomposition_and_never_overlap() {
    let h = harness();
    h.explorer.select_terms(numbered_terms(4)).unwrap();
    h.explorer.confirm().unwrap();
    h.explorer.run_until_settled().await.unwrap();

    assert_eq!(*h.trends.top_calls.lock(), vec![0, 1, 2, 3]);
    assert!(h.trends.completed_at_top_call.lock().iter().all(|&done| done == 4));
    assert_eq!(h.trends.top_max_in_flight.load(Ordering::SeqCst), 1);
}

// ========== Generation Tests ==========

#[tokio::test]
async fn test_double_confirm_only_latest_generation_populates() {
    let h = harness_with(FixtureEngine::echo().with_latency(Duration::from_millis(20)), false);
    h.explorer.select_terms(terms(&["Burn", "Pain"])).unwrap();
    assert_eq!(h.explorer.confirm().unwrap(), 1);
    pump_until(&h.explorer, |phase| matches!(phase, Phase::Decomposing(_))).await;

    h.explorer.select_terms(terms(&["Chickenpox"])).unwrap();
    assert_eq!(h.explorer.confirm().unwrap(), 2);
    assert_eq!(h.explorer.run_until_settled().await.unwrap(), Phase::Ready);

    let state = h.explorer.snapshot();
    assert_eq!(state.generation, 2);
    assert_eq!(state.seasonal().len(), 1);
    assert_eq!(state.seasonal()[0].term, "Chickenpox");
    assert_eq!(state.trend()[0].term, "Chickenpox");
    assert_eq!(state.run.as_ref().unwrap().series.top_queries().len(), 1);

    // A late first-generation response changes nothing.
    h.explorer.handle_event(ExploreEvent::DecompositionResult {
        generation: 1,
        index: 1,
        result: Ok(Decomposition {
            seasonal: vec![SeriesPoint::new("2015-01-04", 99.0); 13],
            trend: vec![SeriesPoint::new("2015-01-04", 99.0); POINTS],
        }),
    });
    let after = h.explorer.snapshot();
    assert_eq!(after.seasonal(), state.seasonal());
    assert_eq!(after.trend(), state.trend());
    assert_eq!(after.phase, Phase::Ready);
}

#[tokio::test]
async fn test_stale_graph_result_is_ignored() {
    let h = harness();
    h.explorer.select_terms(terms(&["Cold"])).unwrap();
    h.explorer.confirm().unwrap();
    h.explorer.run_until_settled().await.unwrap();
    let before = h.explorer.snapshot();

    h.explorer.handle_event(ExploreEvent::GraphResult {
        generation: 0,
        result: Err(ExploreError::Network("late".to_string())),
    });
    let after = h.explorer.snapshot();
    assert_eq!(after.phase, Phase::Ready);
    assert_eq!(after.seasonal(), before.seasonal());
    assert!(after.last_error.is_none());
}

#[tokio::test]
async fn test_current_generation_replay_after_ready_is_ignored() {
    let h = harness();
    h.explorer.select_terms(terms(&["Influenza", "Cold"])).unwrap();
    let generation = h.explorer.confirm().unwrap();
    h.explorer.run_until_settled().await.unwrap();
    let before = h.explorer.snapshot();

    h.explorer.handle_event(ExploreEvent::DecompositionResult {
        generation,
        index: 1,
        result: Ok(Decomposition {
            seasonal: vec![SeriesPoint::new("2015-01-04", 99.0); 13],
            trend: vec![SeriesPoint::new("2015-01-04", 99.0); POINTS],
        }),
    });
    h.explorer.handle_event(ExploreEvent::TopQueriesResult {
        generation,
        index: 0,
        result: Err(ExploreError::Network("replayed".to_string())),
    });

    let after = h.explorer.snapshot();
    assert_eq!(after.phase, Phase::Ready);
    assert_eq!(after.seasonal(), before.seasonal());
    assert_eq!(after.trend(), before.trend());
    assert_eq!(
        after.run.as_ref().unwrap().series.top_queries(),
        before.run.as_ref().unwrap().series.top_queries()
    );
    assert!(after.last_error.is_none());
}

// ========== Merge Tests ==========

#[tokio::test]
async fn test_toggle_merge_leaves_accumulators_untouched() {
    let h = harness();
    h.explorer.select_terms(terms(&["Influenza", "Cold"])).unwrap();
    h.explorer.confirm().unwrap();
    h.explorer.run_until_settled().await.unwrap();
    let before = h.explorer.snapshot();

    assert_eq!(h.explorer.merge_label(), "Merge Charts");
    assert!(h.explorer.toggle_merge());
    assert_eq!(h.explorer.merge_label(), "Split Charts");
    assert_eq!(h.trend_chart.updates().last().unwrap(), before.total());

    assert!(!h.explorer.toggle_merge());
    assert!(h.explorer.toggle_merge());

    let after = h.explorer.snapshot();
    assert_eq!(after.seasonal(), before.seasonal());
    assert_eq!(after.trend(), before.trend());
    assert_eq!(after.total(), before.total());
    assert_eq!(
        after.run.as_ref().unwrap().series.top_queries(),
        before.run.as_ref().unwrap().series.top_queries()
    );
    assert_eq!(h.trend_chart.hide_count(), 3);
    assert_eq!(h.seasonal_chart.updates().len(), 4);
}

// ========== Failure Tests ==========

#[tokio::test]
async fn test_graph_failure_moves_to_failed() {
    let h = harness_with(FixtureEngine::echo(), true);
    h.explorer.select_terms(terms(&["Cold"])).unwrap();
    h.explorer.confirm().unwrap();

    assert_eq!(h.explorer.run_until_settled().await.unwrap(), Phase::Failed);
    let state = h.explorer.snapshot();
    assert!(!state.is_loading);
    assert!(state.last_error.unwrap().contains("503"));
    assert!(h.seasonal_chart.updates().is_empty());
    assert_eq!(h.engine.requests().len(), 0);
}

#[tokio::test]
async fn test_top_queries_failure_keeps_decomposition_and_fails_run() {
    let h = build_harness(
        FixtureEngine::echo().with_latency(Duration::from_millis(2)),
        Duration::from_secs(5),
        |channel| MockTrends::failing_top_queries_at(channel, 1),
    );
    h.explorer.select_terms(terms(&["Influenza", "Cold"])).unwrap();
    h.explorer.confirm().unwrap();

    assert_eq!(h.explorer.run_until_settled().await.unwrap(), Phase::Failed);
    let state = h.explorer.snapshot();
    assert!(!state.is_loading);
    assert_eq!(state.seasonal().len(), 2);
    assert_eq!(state.trend().len(), 2);
    assert!(state.run.as_ref().unwrap().series.top_queries().is_empty());
    assert!(state.last_error.unwrap().contains("boom"));
    assert_eq!(*h.trends.top_calls.lock(), vec![0, 1]);
}

#[tokio::test]
async fn test_decomposition_timeout_fails_run() {
    let h = build_harness(
        FixtureEngine::echo().with_latency(Duration::from_millis(200)),
        Duration::from_millis(20),
        MockTrends::new,
    );
    h.explorer.select_terms(terms(&["Cold"])).unwrap();
    h.explorer.confirm().unwrap();

    assert_eq!(h.explorer.run_until_settled().await.unwrap(), Phase::Failed);
    let state = h.explorer.snapshot();
    assert!(!state.is_loading);
    assert!(state.seasonal().is_empty());
    assert!(state.trend().is_empty());
    assert!(state.last_error.unwrap().starts_with("Network error"));
    assert!(h.trends.top_calls.lock().is_empty());
    assert!(h.seasonal_chart.updates().is_empty());
}

#[tokio::test]
async fn test_protocol_failure_discards_partial_decomposition_then_recovers() {
    let engine = FixtureEngine::canned(vec![good_response(), "seasonal:1,2trend:3".to_string()]);
    let h = harness_with(engine, false);

    h.explorer.select_terms(terms(&["Burn", "Pain"])).unwrap();
    h.explorer.confirm().unwrap();
    assert_eq!(h.explorer.run_until_settled().await.unwrap(), Phase::Failed);

    let state = h.explorer.snapshot();
    assert!(state.seasonal().is_empty());
    assert!(state.trend().is_empty());
    assert!(state.last_error.unwrap().starts_with("Protocol error"));
    assert!(h.trends.top_calls.lock().is_empty());

    // Canned responses wrap, so the next round trip is well-formed again.
    h.explorer.select_terms(terms(&["Burn"])).unwrap();
    h.explorer.confirm().unwrap();
    assert_eq!(h.explorer.run_until_settled().await.unwrap(), Phase::Ready);
    assert_eq!(h.explorer.snapshot().seasonal()[0].points[0].value, 1.5);
}

// ========== Filter Tests ==========

#[tokio::test]
async fn test_cancel_and_empty_confirm_start_no_run() {
    let h = harness();
    h.explorer.select_terms(terms(&["Cold"])).unwrap();
    h.explorer.cancel();

    assert!(matches!(h.explorer.confirm(), Err(ExploreError::Validation(_))));
    assert_eq!(h.explorer.phase(), Phase::Idle);
    assert_eq!(h.explorer.snapshot().generation, 0);
}

#[tokio::test]
async fn test_load_curated_runs_without_pending_stage() {
    let h = harness();
    let curated = Filter {
        terms: terms(&["Mononucleosis"]),
        geo: Geo::new("AU", "Australia"),
    };
    h.explorer.load_curated(curated.clone()).unwrap();
    assert_eq!(h.explorer.run_until_settled().await.unwrap(), Phase::Ready);

    let state = h.explorer.snapshot();
    assert_eq!(state.filter.confirmed(), curated);
    assert!(!state.filter.affordance_visible());
}
