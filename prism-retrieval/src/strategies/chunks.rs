//! Chunk similarity search, chunk hydration, and cross-strategy reranking.

use std::collections::HashMap;
use std::sync::Arc;

use prism_core::errors::PrismResult;
use prism_core::traits::IGraphClient;
use prism_graph::query::{node_result, node_result_with};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::context::QaContext;
use crate::selector::Selector;
use crate::strategies::facts::{EXPANDED_FACTS, FACT_SIMILARITY_SEARCH};
use crate::strategy::Strategy;

/// Result-entry key for [`ChunkSimilaritySearch`].
pub const CHUNK_SIMILARITY_SEARCH: &str = "chunk-similarity-search";
/// Result-entry key for [`GetChunks`].
pub const CHUNKS: &str = "chunks";
/// Result-entry key for [`RerankChunks`].
pub const RERANKED_CHUNKS: &str = "reranked-chunks";

/// Over-fetch escalation sequence for the ANN query.
const OVER_FETCH_MULTIPLIERS: [usize; 3] = [2, 10, 30];

/// Vector search over chunk embeddings with adaptive over-fetch.
///
/// ANN hits that are not Chunk-labelled or cannot reach a Source drop out
/// of the join, so the query re-issues at increasing multipliers until one
/// batch holds at least `top_k` qualifying rows or the sequence is
/// exhausted.
pub struct ChunkSimilaritySearch {
    graph: Arc<dyn IGraphClient>,
    top_k: usize,
}

impl ChunkSimilaritySearch {
    pub fn new(graph: Arc<dyn IGraphClient>, top_k: usize) -> Self {
        Self { graph, top_k }
    }

    fn query(&self, over_fetch: usize) -> String {
        format!(
            "CALL graph.vectors.topKByEmbedding($embedding, {{topK: {over_fetch}, concurrency: 4}})\n\
             YIELD node, score\n\
             WITH node AS chunk, score WHERE 'Chunk' IN labels(chunk)\n\
             MATCH (chunk)-[:SOURCE]->(source:Source)\n\
             RETURN {{\n    score: score,\n    {source},\n    {chunk}\n}} \
             AS result ORDER BY result.score ASC LIMIT {top_k}",
            source = node_result("source"),
            chunk = node_result_with("chunk", &["chunkId"]),
            top_k = self.top_k,
        )
    }
}

impl Strategy for ChunkSimilaritySearch {
    fn name(&self) -> &'static str {
        CHUNK_SIMILARITY_SEARCH
    }

    fn accept(&self, mut context: QaContext) -> PrismResult<QaContext> {
        let mut results: Vec<Value> = Vec::new();

        for multiplier in OVER_FETCH_MULTIPLIERS {
            let mut params = Map::new();
            params.insert(
                "embedding".to_string(),
                json!(context.user_context().question_embedding()),
            );

            let rows = self
                .graph
                .execute(&self.query(self.top_k * multiplier), params)?;
            results = rows
                .into_iter()
                .filter_map(|row| row.get("result").cloned())
                .collect();

            if results.len() >= self.top_k {
                debug!(multiplier, chunks = results.len(), "over-fetch satisfied");
                break;
            }
        }

        results.truncate(self.top_k);
        context.append(CHUNK_SIMILARITY_SEARCH, results);
        Ok(context)
    }
}

/// Hydrate full chunk+source records for chunk ids surfaced upstream.
pub struct GetChunks {
    graph: Arc<dyn IGraphClient>,
    sources: Vec<&'static str>,
    top_n: usize,
}

impl GetChunks {
    pub fn new(graph: Arc<dyn IGraphClient>, sources: Vec<&'static str>, top_n: usize) -> Self {
        Self {
            graph,
            sources,
            top_n,
        }
    }

    fn query() -> String {
        format!(
            "MATCH (chunk:Chunk)-[:SOURCE]->(source) WHERE chunk.chunkId IN $chunk_ids\n\
             RETURN {{\n    {chunk},\n    {source}\n}} AS result",
            chunk = node_result("chunk"),
            source = node_result("source"),
        )
    }
}

impl Strategy for GetChunks {
    fn name(&self) -> &'static str {
        CHUNKS
    }

    fn accept(&self, mut context: QaContext) -> PrismResult<QaContext> {
        let selector = Selector::parse("chunk/chunkId");
        let chunk_ids: Vec<Value> = context
            .select(&self.sources, &selector)
            .into_iter()
            .flatten()
            .take(self.top_n)
            .cloned()
            .collect();

        let mut params = Map::new();
        params.insert("chunk_ids".to_string(), Value::Array(chunk_ids));

        let rows = self.graph.execute(&Self::query(), params)?;
        let results: Vec<Value> = rows
            .into_iter()
            .filter_map(|row| row.get("result").cloned())
            .collect();

        debug!(chunks = results.len(), "chunk hydration complete");
        context.append(CHUNKS, results);
        Ok(context)
    }
}

/// Merge candidates from multiple strategies into one ranked list.
///
/// Raw scores are ascending-is-better distances. Dividing the max raw score
/// by each score inverts the ordering so closer items rank higher, and
/// records reaching the same chunk through different strategies sum their
/// rescored values, so convergent evidence outranks a single strong hit.
pub struct RerankChunks {
    sources: Vec<&'static str>,
}

impl RerankChunks {
    pub fn new() -> Self {
        Self::with_sources(vec![
            CHUNK_SIMILARITY_SEARCH,
            FACT_SIMILARITY_SEARCH,
            EXPANDED_FACTS,
        ])
    }

    pub fn with_sources(sources: Vec<&'static str>) -> Self {
        Self { sources }
    }
}

impl Default for RerankChunks {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl Strategy for RerankChunks {
    fn name(&self) -> &'static str {
        RERANKED_CHUNKS
    }

    fn accept(&self, mut context: QaContext) -> PrismResult<QaContext> {
        let candidates = context.results_for(&self.sources);

        // Empty candidate set leaves the default divisor in place.
        let max_score = candidates
            .iter()
            .filter_map(|record| record.get("score").and_then(Value::as_f64))
            .fold(None, |acc: Option<f64>, score| {
                Some(acc.map_or(score, |max| max.max(score)))
            })
            .unwrap_or(1.0);

        let mut order: Vec<String> = Vec::new();
        let mut merged: HashMap<String, Value> = HashMap::new();

        for record in candidates {
            let Some(score) = record.get("score").and_then(Value::as_f64) else {
                continue;
            };
            let Some(chunk_id) = record.pointer("/chunk/chunkId").and_then(Value::as_str) else {
                debug!("skipping rerank candidate without a chunk id");
                continue;
            };

            let rescored = round2(max_score / score);

            match merged.get_mut(chunk_id) {
                Some(existing) => {
                    let combined =
                        existing.get("score").and_then(Value::as_f64).unwrap_or(0.0) + rescored;
                    if let Some(object) = existing.as_object_mut() {
                        object.insert("score".to_string(), json!(combined));
                    }
                }
                None => {
                    // Clone before rescoring: the upstream entry stays intact.
                    let mut candidate = record.clone();
                    if let Some(object) = candidate.as_object_mut() {
                        object.insert("score".to_string(), json!(rescored));
                    }
                    order.push(chunk_id.to_string());
                    merged.insert(chunk_id.to_string(), candidate);
                }
            }
        }

        let mut reranked: Vec<Value> = order
            .into_iter()
            .filter_map(|chunk_id| merged.remove(&chunk_id))
            .collect();
        reranked.sort_by(|a, b| {
            let score_a = a.get("score").and_then(Value::as_f64).unwrap_or(0.0);
            let score_b = b.get("score").and_then(Value::as_f64).unwrap_or(0.0);
            score_b
                .partial_cmp(&score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(chunks = reranked.len(), "rerank complete");
        context.append(RERANKED_CHUNKS, reranked);
        Ok(context)
    }
}
