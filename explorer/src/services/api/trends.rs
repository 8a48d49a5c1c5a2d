//! # Trends Endpoints
//!
//! Interest series, top queries and averages.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::dto::trends::{Filter, GraphAverages, GraphResponse, RawGraph, TopQueries};
use shared::utils::{join_term_entities, join_term_names};

use super::client::ApiClient;
use crate::core::error::{ExploreError, Result};

/// `top-queries` answers with either a single entry or a list starting at the
/// requested index.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TopQueriesPayload {
    Many(Vec<TopQueries>),
    One(TopQueries),
}

impl TopQueriesPayload {
    fn into_first(self) -> Option<TopQueries> {
        match self {
            TopQueriesPayload::Many(list) => list.into_iter().next(),
            TopQueriesPayload::One(entry) => Some(entry),
        }
    }
}

/// GET `path` with the filter's terms and geo as query parameters.
async fn get_json<T: DeserializeOwned>(
    client: &ApiClient,
    path: &str,
    filter: &Filter,
    extra: &[(&str, String)],
) -> Result<T> {
    let url = format!("{}{}", client.base_url(), path);
    let start = std::time::Instant::now();

    let mut query = vec![
        ("terms", join_term_entities(&filter.terms)),
        ("geo", filter.geo.iso.clone()),
    ];
    query.extend(extra.iter().cloned());

    let response = client
        .client
        .get(&url)
        .query(&query)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                duration_ms = start.elapsed().as_millis(),
                "Trends fetch network error"
            );
            ExploreError::from(e)
        })?;

    let status = response.status();
    let duration = start.elapsed();

    if status.is_success() {
        response.json::<T>().await.map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                duration_ms = duration.as_millis(),
                "Trends response parse error"
            );
            ExploreError::Network(format!("Failed to parse response: {}", e))
        })
    } else {
        tracing::warn!(
            url = %url,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Trends fetch failed with non-success status"
        );
        Err(ExploreError::Network(format!("Failed to fetch {}: {}", path, status)))
    }
}

/// Raw interest series for every term of `filter`.
#[tracing::instrument(skip(client, filter), fields(terms = %join_term_names(&filter.terms), geo = %filter.geo.iso))]
pub async fn get_graph(client: &ApiClient, filter: &Filter) -> Result<RawGraph> {
    let response: GraphResponse = get_json(client, "/api/trends/graph", filter, &[]).await?;

    if response.lines.len() != filter.terms.len() {
        tracing::warn!(
            lines = response.lines.len(),
            terms = filter.terms.len(),
            "Graph line count does not match term count"
        );
        return Err(ExploreError::Network(format!(
            "Graph returned {} lines for {} terms",
            response.lines.len(),
            filter.terms.len()
        )));
    }

    let graph = response.into_term_series(&filter.terms);
    tracing::debug!(
        lines = graph.len(),
        points = graph.first().map(|s| s.points.len()).unwrap_or(0),
        "Graph fetched successfully"
    );
    Ok(graph)
}

/// Top related queries for the term at `start_index`.
#[tracing::instrument(skip(client, filter), fields(geo = %filter.geo.iso))]
pub async fn get_top_queries(
    client: &ApiClient,
    filter: &Filter,
    start_index: usize,
) -> Result<TopQueries> {
    let payload: TopQueriesPayload = get_json(
        client,
        "/api/trends/top-queries",
        filter,
        &[("index", start_index.to_string())],
    )
    .await?;

    payload
        .into_first()
        .ok_or_else(|| ExploreError::Network(format!("No top queries returned for index {}", start_index)))
}

/// Average interest per term over the filter window.
#[tracing::instrument(skip(client, filter), fields(terms = %join_term_names(&filter.terms)))]
pub async fn get_graph_averages(client: &ApiClient, filter: &Filter) -> Result<GraphAverages> {
    get_json(client, "/api/trends/averages", filter, &[]).await
}
