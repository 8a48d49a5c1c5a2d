//! In-memory [`ChartSink`] that records every call.

use parking_lot::Mutex;
use shared::dto::trends::TermSeries;

use crate::core::service::ChartSink;

#[derive(Debug, Default)]
pub struct RecordingChart {
    updates: Mutex<Vec<Vec<TermSeries>>>,
    hides: Mutex<usize>,
}

impl RecordingChart {
    /// Every `update_data` payload, oldest first.
    pub fn updates(&self) -> Vec<Vec<TermSeries>> {
        self.updates.lock().clone()
    }

    pub fn hide_count(&self) -> usize {
        *self.hides.lock()
    }
}

impl ChartSink for RecordingChart {
    fn update_data(&self, series: &[TermSeries]) {
        self.updates.lock().push(series.to_vec());
    }

    fn hide(&self) {
        *self.hides.lock() += 1;
    }
}
