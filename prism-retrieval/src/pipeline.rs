//! Sequences strategies over a context, threading output to input.

use std::sync::Arc;

use prism_core::config::RetrievalConfig;
use prism_core::errors::PrismResult;
use prism_core::traits::{ICompletionProvider, IGraphClient, IVectorIndex};
use tracing::{debug, info};

use crate::context::QaContext;
use crate::strategies::chunks::{ChunkSimilaritySearch, GetChunks, RerankChunks, RERANKED_CHUNKS};
use crate::strategies::communities::GetCommunities;
use crate::strategies::facts::{
    FactExpansion, GraphFactSimilaritySearch, IndexFactSimilaritySearch,
};
use crate::strategies::keywords::{ExtractKeywords, KeywordSearch};
use crate::strategy::Strategy;

/// An ordered composition of strategies.
///
/// The ordering encodes the data dependencies between stages: a later
/// stage's reads require the earlier stage's entry to already be in the
/// log, so the sequence must be preserved exactly. No branching, no
/// conditional skipping.
pub struct Pipeline {
    stages: Vec<Box<dyn Strategy>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Strategy>>) -> Self {
        Self { stages }
    }

    /// The canonical GraphRAG stage ordering: keyword extraction and
    /// lookup, chunk and fact similarity, fact expansion, rerank, chunk
    /// hydration (from the reranked list), community lookup.
    pub fn standard(
        graph: Arc<dyn IGraphClient>,
        completion: Arc<dyn ICompletionProvider>,
        config: &RetrievalConfig,
    ) -> Self {
        let facts = Box::new(GraphFactSimilaritySearch::new(
            graph.clone(),
            config.fact_top_k,
        ));
        Self::with_fact_backend(graph, completion, facts, config)
    }

    /// The standard ordering with the external vector index as the
    /// fact-similarity backend. Identical result-set names either way.
    pub fn standard_with_index(
        graph: Arc<dyn IGraphClient>,
        index: Arc<dyn IVectorIndex>,
        completion: Arc<dyn ICompletionProvider>,
        config: &RetrievalConfig,
    ) -> Self {
        let facts = Box::new(IndexFactSimilaritySearch::new(index, config.fact_top_k));
        Self::with_fact_backend(graph, completion, facts, config)
    }

    fn with_fact_backend(
        graph: Arc<dyn IGraphClient>,
        completion: Arc<dyn ICompletionProvider>,
        facts: Box<dyn Strategy>,
        config: &RetrievalConfig,
    ) -> Self {
        Self::new(vec![
            Box::new(ExtractKeywords::new(completion, config.max_keywords)),
            Box::new(KeywordSearch::new(graph.clone())),
            Box::new(ChunkSimilaritySearch::new(graph.clone(), config.chunk_top_k)),
            facts,
            Box::new(FactExpansion::new(
                graph.clone(),
                config.expansion_top_k,
                config.frontier_size,
                config.max_depth,
            )),
            Box::new(RerankChunks::new()),
            Box::new(GetChunks::new(
                graph.clone(),
                vec![RERANKED_CHUNKS],
                config.chunk_top_n,
            )),
            Box::new(GetCommunities::new(graph, config.community_top_n)),
        ])
    }

    /// Thread the context through every stage in order.
    pub fn run(&self, mut context: QaContext) -> PrismResult<QaContext> {
        for stage in &self.stages {
            debug!(strategy = stage.name(), "running strategy");
            context = stage.accept(context)?;
        }

        info!(
            stages = self.stages.len(),
            entries = context.entries().len(),
            "pipeline complete"
        );
        Ok(context)
    }
}
