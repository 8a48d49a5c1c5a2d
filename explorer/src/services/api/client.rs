//! # API Client
//!
//! HTTP client for the trends API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::dto::trends::{Filter, GraphAverages, RawGraph, TopQueries};

use crate::core::error::Result;
use crate::core::service::TrendsService;

/// Default base URL for the trends API server
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3001";

/// HTTP client for the trends API.
///
/// Holds a pooled `reqwest::Client`; clone the `Arc` around it rather than the
/// client itself.
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL for API requests, without trailing slash.
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, Duration::from_secs(10))
    }
}

#[async_trait]
impl TrendsService for ApiClient {
    async fn get_graph(&self, filter: &Filter) -> Result<RawGraph> {
        crate::services::api::trends::get_graph(self, filter).await
    }

    async fn get_top_queries(&self, filter: &Filter, start_index: usize) -> Result<TopQueries> {
        crate::services::api::trends::get_top_queries(self, filter, start_index).await
    }

    async fn get_graph_averages(&self, filter: &Filter) -> Result<GraphAverages> {
        crate::services::api::trends::get_graph_averages(self, filter).await
    }
}
