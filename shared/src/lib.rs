//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the explorer and the trends API.
//! All DTOs use JSON serialization via `serde` for API communication.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for API communication
//!   - **[`dto::trends`]**: Terms, geos, filters, interest series and top queries
//! - **[`utils`]**: Shared utility functions
//!   - **[`utils::join_term_names`]**: Comma-join term names for query strings and logs
//!   - **[`utils::truncate_label`]**: Shorten long labels with an ellipsis
//!
//! ## Wire Format
//!
//! All DTOs serialize to JSON using the default `serde` behavior:
//! - Field names use **snake_case** in Rust, which maps to **snake_case** in JSON by default
//! - Optional fields are omitted from JSON when `None` (using `#[serde(skip_serializing_if = "Option::is_none")]`)
//! - All structs implement both `Serialize` and `Deserialize` for bidirectional communication
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::trends::{GraphResponse, Term};
//!
//! let body = r#"{"lines":[{"points":[{"date":"2017-01-01","value":40.0}]}]}"#;
//! let response: GraphResponse = serde_json::from_str(body).unwrap();
//! let terms = vec![Term::new("/m/flu", "Influenza")];
//! let series = response.into_term_series(&terms);
//! assert_eq!(series[0].term, "Influenza");
//! ```

pub mod dto;
pub mod utils;

// Re-export commonly used types for convenience
// Note: Wildcard re-exports are used here since shared is a DTO library
// where all exports are meant to be public API
pub use dto::*;
pub use utils::*;
