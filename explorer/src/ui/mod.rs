//! # Chart Sinks
//!
//! [`ChartSink`](crate::core::service::ChartSink) implementations.
//!
//! - [`console`]: renders each series as a labelled text sparkline
//! - [`recording`]: keeps every call in memory for inspection

pub mod console;
pub mod recording;

pub use console::{ChartKind, ConsoleChart};
pub use recording::RecordingChart;
