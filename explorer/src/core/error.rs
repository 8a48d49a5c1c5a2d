//! # Common Error Types
//!
//! Consolidated error handling for the explorer.
//!
//! ## Error Categories
//!
//! - **Network**: trends API or decomposition engine unreachable, non-success
//!   status, unparseable JSON, round trip timed out
//! - **Protocol**: decomposition response violates the
//!   `seasonal:<13 numbers>trend:<N numbers>` contract
//! - **Stale**: a response tagged with a generation that is no longer current
//! - **Validation**: rejected user input (empty or oversized term selection)
//! - **State**: an accumulator or state-machine invariant was about to be broken
//! - **Config**: invalid environment configuration
//!
//! `Network`, `Protocol` and `State` fail a pipeline run. `Stale` is dropped silently
//! by the event handler and never reaches the user.
//!
//! ```rust
//! use explorer::core::error::ExploreError;
//!
//! let err = ExploreError::Protocol("missing trend marker".to_string());
//! assert_eq!(err.to_string(), "Protocol error: missing trend marker");
//! assert!(err.is_fatal());
//! ```

use thiserror::Error;

/// Explorer-wide error type.
///
/// `Clone` so results can travel inside [`crate::app::ExploreEvent`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExploreError {
    /// Fetch failed: connection, HTTP status, JSON body or timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed decomposition response (missing markers, non-numeric tokens).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Response belongs to a superseded run.
    #[error("Stale response: generation {got} is not the current generation {expected}")]
    Stale { expected: u64, got: u64 },

    /// Rejected user input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invariant violation inside the state machine.
    #[error("State error: {0}")]
    State(String),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl ExploreError {
    /// Whether this error moves a run to `Failed`.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExploreError::Network(_) | ExploreError::Protocol(_) | ExploreError::State(_)
        )
    }
}

/// Convenience type alias for `Result<T, ExploreError>`.
pub type Result<T> = std::result::Result<T, ExploreError>;

impl From<lib_utils::envs::Error> for ExploreError {
    fn from(err: lib_utils::envs::Error) -> Self {
        ExploreError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for ExploreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExploreError::Network(format!("Request timed out: {}", err))
        } else {
            ExploreError::Network(err.to_string())
        }
    }
}
