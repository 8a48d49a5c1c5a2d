//! # Trends API Client Module
//!
//! HTTP client for the trends API: interest series, top queries, averages.
//!
//! ## Module Structure
//!
//! ```text
//! api/
//! ├── mod.rs      - Module exports and documentation
//! ├── client.rs   - ApiClient struct and the TrendsService impl
//! └── trends.rs   - Endpoints (graph, top-queries, averages)
//! ```

pub mod client;
pub mod trends;

pub use client::{ApiClient, DEFAULT_API_BASE_URL};
