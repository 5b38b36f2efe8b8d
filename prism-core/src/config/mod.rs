//! Configuration: serde-default structs loadable from TOML.

pub mod defaults;

mod graph_config;
mod model_config;
mod retrieval_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, PrismResult};

pub use graph_config::{GraphConfig, VectorIndexConfig};
pub use model_config::{CompletionConfig, EmbeddingConfig, RetryConfig};
pub use retrieval_config::RetrievalConfig;

/// Top-level configuration for a prism deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismConfig {
    pub graph: GraphConfig,
    /// External vector index for the alternative fact-similarity backend.
    /// Absent means the graph-native backend is the only one available.
    pub vector_index: Option<VectorIndexConfig>,
    pub embedding: EmbeddingConfig,
    pub completion: CompletionConfig,
    pub retrieval: RetrievalConfig,
    pub retry: RetryConfig,
}

impl PrismConfig {
    /// Load configuration from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> PrismResult<Self> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        let config: PrismConfig = toml::from_str(&text).map_err(ConfigError::from)?;
        Ok(config)
    }
}
