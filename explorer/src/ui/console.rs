//! # Console Chart
//!
//! Text rendering of per-term series for the command-line binary.

use std::io::Write;

use parking_lot::Mutex;
use shared::dto::trends::TermSeries;
use shared::utils::truncate_label;

use crate::core::service::ChartSink;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const LABEL_WIDTH: usize = 18;
const MAX_SPARK_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Seasonal,
    Trend,
    Total,
}

impl ChartKind {
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Seasonal => "Seasonal per year",
            ChartKind::Trend => "Trend over time",
            ChartKind::Total => "Interest over time",
        }
    }
}

/// Renders into any writer; stdout by default.
pub struct ConsoleChart {
    kind: Mutex<ChartKind>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleChart {
    pub fn new(kind: ChartKind) -> Self {
        Self::with_writer(kind, Box::new(std::io::stdout()))
    }

    pub fn with_writer(kind: ChartKind, out: Box<dyn Write + Send>) -> Self {
        Self {
            kind: Mutex::new(kind),
            out: Mutex::new(out),
        }
    }

    /// Switch what the chart claims to show (trend vs. total on merge).
    pub fn set_kind(&self, kind: ChartKind) {
        *self.kind.lock() = kind;
    }
}

/// One character per point, resampled down to `width` when longer.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let step = (values.len() as f64 / width as f64).max(1.0);

    let mut line = String::new();
    let mut cursor = 0.0;
    while (cursor as usize) < values.len() {
        let value = values[cursor as usize];
        let level = if span > 0.0 {
            (((value - min) / span) * (SPARK_LEVELS.len() - 1) as f64).round() as usize
        } else {
            0
        };
        line.push(SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]);
        cursor += step;
    }
    line
}

/// Render `series` under the chart title.
pub fn render(kind: ChartKind, series: &[TermSeries]) -> String {
    let mut text = format!("── {} ──\n", kind.title());
    for entry in series {
        let values: Vec<f64> = entry.points.iter().map(|p| p.value).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let last = values.last().copied().unwrap_or_default();
        text.push_str(&format!(
            "{:<width$} {}  min {:.2} max {:.2} last {:.2}\n",
            truncate_label(&entry.term, LABEL_WIDTH),
            sparkline(&values, MAX_SPARK_WIDTH),
            if values.is_empty() { 0.0 } else { min },
            if values.is_empty() { 0.0 } else { max },
            last,
            width = LABEL_WIDTH
        ));
    }
    text
}

impl ChartSink for ConsoleChart {
    fn update_data(&self, series: &[TermSeries]) {
        let text = render(*self.kind.lock(), series);
        let mut out = self.out.lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write chart");
        }
    }

    fn hide(&self) {
        tracing::trace!("Console chart has no transient state to hide");
    }
}
