//! # Explorer Configuration
//!
//! Read from the environment (after `.env` is loaded by the binary):
//!
//! | Variable                       | Default                           |
//! |--------------------------------|-----------------------------------|
//! | `TRENDS_API_URL`               | `http://127.0.0.1:3001`           |
//! | `DECOMPOSITION_MODE`           | `fixture` (`live` or `fixture`)   |
//! | `DECOMPOSITION_URL`            | `ws://127.0.0.1:3838/websocket/`  |
//! | `DECOMPOSITION_FIXTURE_FILE`   | unset (echo fixture)              |
//! | `ROUND_TRIP_TIMEOUT_MS`        | `10000`                           |
//! | `DECOMPOSITION_KEEPALIVE_SECS` | `10`                              |
//! | `MAX_TERMS`                    | `3`                               |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lib_utils::{get_env, get_env_or, get_env_parse_or};

use crate::app::{ExplorerSettings, DEFAULT_MAX_TERMS};
use crate::core::error::{ExploreError, Result};
use crate::services::api::DEFAULT_API_BASE_URL;

pub const DEFAULT_DECOMPOSITION_URL: &str = "ws://127.0.0.1:3838/websocket/";
pub const DEFAULT_ROUND_TRIP_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_KEEPALIVE_SECS: u64 = 10;

/// Largest accepted `MAX_TERMS`.
const MAX_TERMS_CEILING: usize = 10;

/// Which decomposition engine backs the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompositionMode {
    /// Statistics server over WebSocket
    Live,
    /// In-process fixture engine
    Fixture,
}

impl FromStr for DecompositionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(DecompositionMode::Live),
            "fixture" => Ok(DecompositionMode::Fixture),
            other => Err(format!("unknown decomposition mode {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    pub trends_api_url: String,
    pub decomposition_mode: DecompositionMode,
    pub decomposition_url: String,
    /// Canned responses for the fixture engine; echo when unset
    pub fixture_file: Option<PathBuf>,
    pub round_trip_timeout: Duration,
    /// Zero disables the keep-alive ping
    pub keepalive_interval: Duration,
    pub max_terms: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            trends_api_url: DEFAULT_API_BASE_URL.to_string(),
            decomposition_mode: DecompositionMode::Fixture,
            decomposition_url: DEFAULT_DECOMPOSITION_URL.to_string(),
            fixture_file: None,
            round_trip_timeout: Duration::from_millis(DEFAULT_ROUND_TRIP_TIMEOUT_MS),
            keepalive_interval: Duration::from_secs(DEFAULT_KEEPALIVE_SECS),
            max_terms: DEFAULT_MAX_TERMS,
        }
    }
}

impl ExplorerConfig {
    /// Load and validate configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            trends_api_url: get_env_or("TRENDS_API_URL", DEFAULT_API_BASE_URL),
            decomposition_mode: get_env_parse_or("DECOMPOSITION_MODE", DecompositionMode::Fixture)?,
            decomposition_url: get_env_or("DECOMPOSITION_URL", DEFAULT_DECOMPOSITION_URL),
            fixture_file: get_env("DECOMPOSITION_FIXTURE_FILE").ok().map(PathBuf::from),
            round_trip_timeout: Duration::from_millis(get_env_parse_or(
                "ROUND_TRIP_TIMEOUT_MS",
                DEFAULT_ROUND_TRIP_TIMEOUT_MS,
            )?),
            keepalive_interval: Duration::from_secs(get_env_parse_or(
                "DECOMPOSITION_KEEPALIVE_SECS",
                DEFAULT_KEEPALIVE_SECS,
            )?),
            max_terms: get_env_parse_or("MAX_TERMS", DEFAULT_MAX_TERMS)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.trends_api_url.starts_with("http://") || self.trends_api_url.starts_with("https://")) {
            return Err(ExploreError::Config(format!(
                "TRENDS_API_URL must be http(s), got {}",
                self.trends_api_url
            )));
        }
        if self.decomposition_mode == DecompositionMode::Live
            && !(self.decomposition_url.starts_with("ws://") || self.decomposition_url.starts_with("wss://"))
        {
            return Err(ExploreError::Config(format!(
                "DECOMPOSITION_URL must be ws(s), got {}",
                self.decomposition_url
            )));
        }
        if self.round_trip_timeout.is_zero() {
            return Err(ExploreError::Config("ROUND_TRIP_TIMEOUT_MS must be positive".to_string()));
        }
        if self.max_terms == 0 || self.max_terms > MAX_TERMS_CEILING {
            return Err(ExploreError::Config(format!(
                "MAX_TERMS must be between 1 and {}, got {}",
                MAX_TERMS_CEILING, self.max_terms
            )));
        }
        Ok(())
    }

    pub fn settings(&self) -> ExplorerSettings {
        ExplorerSettings {
            round_trip_timeout: self.round_trip_timeout,
            max_terms: self.max_terms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExplorerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.decomposition_mode, DecompositionMode::Fixture);
        assert_eq!(config.settings().max_terms, 3);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("LIVE".parse::<DecompositionMode>(), Ok(DecompositionMode::Live));
        assert_eq!(" fixture ".parse::<DecompositionMode>(), Ok(DecompositionMode::Fixture));
        assert!("shiny".parse::<DecompositionMode>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = ExplorerConfig {
            trends_api_url: "ftp://trends".to_string(),
            ..ExplorerConfig::default()
        };
        assert!(matches!(bad_url.validate(), Err(ExploreError::Config(_))));

        let bad_ws = ExplorerConfig {
            decomposition_mode: DecompositionMode::Live,
            decomposition_url: "http://127.0.0.1:3838".to_string(),
            ..ExplorerConfig::default()
        };
        assert!(bad_ws.validate().is_err());

        let no_terms = ExplorerConfig {
            max_terms: 0,
            ..ExplorerConfig::default()
        };
        assert!(no_terms.validate().is_err());
    }
}
