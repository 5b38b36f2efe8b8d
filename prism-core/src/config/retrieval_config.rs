use serde::{Deserialize, Serialize};

use super::defaults;

/// Tuning knobs for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Max keywords requested from the extraction prompt.
    pub max_keywords: usize,
    /// Top-k facts from similarity search.
    pub fact_top_k: usize,
    /// Facts kept per expansion iteration.
    pub expansion_top_k: usize,
    /// Structural candidates considered per expansion iteration.
    pub frontier_size: usize,
    /// Max expansion iterations. Zero disables the walk entirely.
    pub max_depth: usize,
    /// Top-k chunks from similarity search.
    pub chunk_top_k: usize,
    /// Max chunk ids hydrated after reranking.
    pub chunk_top_n: usize,
    /// Max community summaries.
    pub community_top_n: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_keywords: defaults::DEFAULT_MAX_KEYWORDS,
            fact_top_k: defaults::DEFAULT_FACT_TOP_K,
            expansion_top_k: defaults::DEFAULT_EXPANSION_TOP_K,
            frontier_size: defaults::DEFAULT_FRONTIER_SIZE,
            max_depth: defaults::DEFAULT_MAX_DEPTH,
            chunk_top_k: defaults::DEFAULT_CHUNK_TOP_K,
            chunk_top_n: defaults::DEFAULT_CHUNK_TOP_N,
            community_top_n: defaults::DEFAULT_COMMUNITY_TOP_N,
        }
    }
}
