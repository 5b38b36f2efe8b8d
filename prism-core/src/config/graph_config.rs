use serde::{Deserialize, Serialize};

use super::defaults;

/// Graph-store endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Base URL of the openCypher query endpoint.
    pub endpoint: String,
    /// Identifier of the graph to query.
    pub graph_id: String,
    /// Read timeout. Vector procedures can run long on large graphs.
    pub timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            graph_id: String::new(),
            timeout_secs: defaults::DEFAULT_GRAPH_TIMEOUT_SECS,
        }
    }
}

/// External vector-index endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexConfig {
    /// Base URL of the index service.
    pub endpoint: String,
    /// Index holding fact embeddings.
    pub index: String,
    pub timeout_secs: u64,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            index: "fact".to_string(),
            timeout_secs: defaults::DEFAULT_VECTOR_TIMEOUT_SECS,
        }
    }
}
