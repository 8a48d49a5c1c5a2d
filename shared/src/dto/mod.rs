//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures used for communication between
//! the explorer and the trends API.
//!
//! ## Module Organization
//!
//! - [`trends`] - Catalog entities, filters, interest series, top queries and averages
//!
//! ## Serialization Format
//!
//! All DTOs use `serde_json` for JSON serialization:
//!
//! - **Field naming**: snake_case (default serde behavior)
//! - **Optional fields**: Omitted when `None` using `#[serde(skip_serializing_if = "Option::is_none")]`
//! - **All types**: Implement both `Serialize` and `Deserialize`
//!
//! ## Example JSON Communication
//!
//! ```text
//! GET /api/trends/graph?terms=/m/0cycc,/m/01b_21&geo=US
//! ```
//!
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: application/json
//!
//! {
//!   "lines": [
//!     { "points": [ { "date": "2014-01-05", "value": 61.0 }, ... ] },
//!     { "points": [ { "date": "2014-01-05", "value": 12.0 }, ... ] }
//!   ]
//! }
//! ```

pub mod trends;

pub use trends::*;
