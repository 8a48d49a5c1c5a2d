//! # Trends Explorer
//!
//! Acquisition and reconciliation pipeline for search-interest exploration:
//! fetch raw interest series for a set of terms, decompose each term through a
//! single-session statistics engine one request at a time, then fetch related
//! top queries per term, keeping every collection in term order.
//!
//! ## Module Structure
//!
//! - **[`app`]**: `Explorer` state machine, filter state, accumulators, chart gate
//! - **[`catalog`]**: built-in term and country lists
//! - **[`config`]**: environment configuration
//! - **[`core`]**: error type and collaborator traits
//! - **[`debug`]**: logging setup
//! - **[`services`]**: trends API client and decomposition channel/engines
//! - **[`ui`]**: chart sinks (console, recording)

pub mod app;
pub mod catalog;
pub mod config;
pub mod core;
pub mod debug;
pub mod services;
pub mod ui;

pub use app::{ChartSync, Explorer, ExplorerSettings, Phase};
pub use catalog::Catalog;
pub use config::{DecompositionMode, ExplorerConfig};
pub use crate::core::error::{ExploreError, Result};
