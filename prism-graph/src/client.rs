//! HTTP client for an openCypher query endpoint.
//!
//! One attempt per query with a long read timeout. Throttling and
//! consistency are the store's responsibility, not the client's.

use std::time::Duration;

use prism_core::config::GraphConfig;
use prism_core::errors::{GraphError, PrismResult};
use prism_core::traits::IGraphClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

const QUERY_LANGUAGE: &str = "OPEN_CYPHER";

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    #[serde(rename = "graphId")]
    graph_id: &'a str,
    query: &'a str,
    parameters: Map<String, Value>,
    language: &'static str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Value>,
}

/// [`IGraphClient`] over a blocking HTTP client.
pub struct HttpGraphClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    graph_id: String,
}

impl HttpGraphClient {
    pub fn new(config: &GraphConfig) -> PrismResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GraphError::Endpoint {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            graph_id: config.graph_id.clone(),
        })
    }
}

impl IGraphClient for HttpGraphClient {
    fn execute(&self, query: &str, parameters: Map<String, Value>) -> PrismResult<Vec<Value>> {
        let request_id = uuid::Uuid::new_v4();
        debug!(
            %request_id,
            query_len = query.len(),
            params = parameters.len(),
            "executing graph query"
        );

        let response = self
            .http
            .post(format!("{}/queries", self.endpoint))
            .json(&QueryRequest {
                graph_id: &self.graph_id,
                query,
                parameters,
                language: QUERY_LANGUAGE,
            })
            .send()
            .map_err(|e| GraphError::Endpoint {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().unwrap_or_default();
            warn!(%request_id, %status, "graph query rejected");
            return Err(GraphError::QueryFailed {
                reason: format!("{status}: {reason}"),
            }
            .into());
        }

        let body: QueryResponse = response.json().map_err(|e| GraphError::MalformedResponse {
            reason: e.to_string(),
        })?;

        debug!(%request_id, rows = body.results.len(), "graph query complete");
        Ok(body.results)
    }
}
