//! External ANN index client, the alternative fact-similarity substrate.

use std::time::Duration;

use prism_core::config::VectorIndexConfig;
use prism_core::errors::{GraphError, PrismResult};
use prism_core::traits::IVectorIndex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    embedding: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<Value>,
}

/// [`IVectorIndex`] over a blocking HTTP kNN endpoint.
pub struct HttpVectorIndex {
    http: reqwest::blocking::Client,
    endpoint: String,
    index: String,
}

impl HttpVectorIndex {
    pub fn new(config: &VectorIndexConfig) -> PrismResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GraphError::Endpoint {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            index: config.index.clone(),
        })
    }
}

impl IVectorIndex for HttpVectorIndex {
    fn search(&self, embedding: &[f32], top_k: usize) -> PrismResult<Vec<Value>> {
        let request_id = uuid::Uuid::new_v4();
        debug!(%request_id, index = %self.index, top_k, "vector index search");

        let response = self
            .http
            .post(format!(
                "{}/indexes/{}/search",
                self.endpoint, self.index
            ))
            .json(&SearchRequest { embedding, top_k })
            .send()
            .map_err(|e| GraphError::Endpoint {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().unwrap_or_default();
            return Err(GraphError::QueryFailed {
                reason: format!("{status}: {reason}"),
            }
            .into());
        }

        let body: SearchResponse = response.json().map_err(|e| GraphError::MalformedResponse {
            reason: e.to_string(),
        })?;

        debug!(%request_id, hits = body.results.len(), "vector index search complete");
        Ok(body.results)
    }
}
