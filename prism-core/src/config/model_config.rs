use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// URL of the embedding endpoint.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Expected dimensionality of returned vectors.
    pub dimensions: usize,
    /// Max entries in the in-process embedding cache.
    pub cache_size: u64,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            model: String::new(),
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            cache_size: defaults::DEFAULT_EMBEDDING_CACHE_SIZE,
            timeout_secs: defaults::DEFAULT_MODEL_TIMEOUT_SECS,
        }
    }
}

/// Completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// URL of the completion endpoint.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            model: String::new(),
            temperature: defaults::DEFAULT_COMPLETION_TEMPERATURE,
            max_tokens: defaults::DEFAULT_COMPLETION_MAX_TOKENS,
            timeout_secs: defaults::DEFAULT_MODEL_TIMEOUT_SECS,
        }
    }
}

/// Bounded retry for transient model-endpoint failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DEFAULT_RETRY_MAX_ATTEMPTS,
            base_delay_ms: defaults::DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: defaults::DEFAULT_RETRY_MAX_DELAY_MS,
        }
    }
}
