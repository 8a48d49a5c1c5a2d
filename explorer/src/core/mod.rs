//! # Core Abstractions
//!
//! Core traits and error types for dependency injection and testability.
//!
//! - **[`error`]**: Explorer error taxonomy (`ExploreError`, `Result<T>`)
//! - **[`service`]**: Collaborator traits (`TrendsService`, `DecompositionEngine`, `ChartSink`)
//!
//! ## Dependency Injection
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use explorer::core::service::{DecompositionEngine, TrendsService};
//! use explorer::services::api::ApiClient;
//! use explorer::services::decomposition::FixtureEngine;
//!
//! // Live trends API, offline decomposition
//! let trends: Arc<dyn TrendsService> = Arc::new(ApiClient::default());
//! let engine: Arc<dyn DecompositionEngine> = Arc::new(FixtureEngine::echo());
//! ```

pub mod error;
pub mod service;

pub use error::{ExploreError, Result};
pub use service::{ChartSink, DecompositionEngine, TrendsService};
