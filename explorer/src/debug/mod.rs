//! # Debug Infrastructure
//!
//! File logging with daily rotation, optional stderr echo, and a panic hook
//! that records crashes in the log before the default handler runs.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: filter directives (default `explorer=info,warn`)
//! - `EXPLORER_LOG_DIR`: log directory (default `logs`)
//! - `EXPLORER_LOG_STDERR`: `1` to also log to stderr

pub mod config;
pub mod logger;

pub use config::DebugConfig;
pub use logger::init;
