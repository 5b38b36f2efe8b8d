//! Embedding client with bounded retry and a content-hash cache.

use std::time::Duration;

use moka::sync::Cache;
use prism_core::config::EmbeddingConfig;
use prism_core::errors::{ModelError, PrismResult};
use prism_core::traits::{EmbedMode, IEmbeddingProvider};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::retry::RetryPolicy;
use crate::transport;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(rename = "inputType")]
    input_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// [`IEmbeddingProvider`] over a blocking HTTP endpoint.
pub struct HttpEmbeddingClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    dimensions: usize,
    retry: RetryPolicy,
    cache: Cache<String, Vec<f32>>,
}

impl HttpEmbeddingClient {
    pub fn new(config: &EmbeddingConfig, retry: RetryPolicy) -> PrismResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::Transport {
                provider: config.model.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            retry,
            cache: Cache::new(config.cache_size),
        })
    }

    fn cache_key(text: &str, mode: EmbedMode) -> String {
        let keyed = format!("{}::{}", mode.as_str(), text);
        blake3::hash(keyed.as_bytes()).to_hex().to_string()
    }

    fn call(&self, text: &str, mode: EmbedMode) -> Result<Vec<f32>, ModelError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&EmbedRequest {
                model: &self.model,
                input: text,
                input_type: mode.as_str(),
            })
            .send()
            .map_err(|e| transport::send_error(&self.model, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(transport::status_error(&self.model, status, body));
        }

        let body: EmbedResponse = response.json().map_err(|e| ModelError::MalformedOutput {
            reason: e.to_string(),
        })?;

        if body.embedding.len() != self.dimensions {
            return Err(ModelError::MalformedOutput {
                reason: format!(
                    "expected {} dimensions, got {}",
                    self.dimensions,
                    body.embedding.len()
                ),
            });
        }

        Ok(body.embedding)
    }
}

impl IEmbeddingProvider for HttpEmbeddingClient {
    fn embed(&self, text: &str, mode: EmbedMode) -> PrismResult<Vec<f32>> {
        let key = Self::cache_key(text, mode);
        if let Some(hit) = self.cache.get(&key) {
            debug!(mode = mode.as_str(), "embedding cache hit");
            return Ok(hit);
        }

        let embedding = self.retry.run("embed", || self.call(text, mode))?;
        self.cache.insert(key, embedding.clone());
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }
}
