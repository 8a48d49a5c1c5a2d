//! # Services
//!
//! Clients for the explorer's external collaborators.
//!
//! - [`api`]: HTTP client for the trends API
//! - [`decomposition`]: the single-flight decomposition channel and its engines

pub mod api;
pub mod decomposition;
