//! Fact similarity search (two backends) and graph-guided fact expansion.

use std::collections::HashSet;
use std::sync::Arc;

use prism_core::errors::PrismResult;
use prism_core::traits::{IGraphClient, IVectorIndex};
use prism_graph::query::{node_result, node_result_with};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::context::QaContext;
use crate::selector::Selector;
use crate::strategy::Strategy;

/// Result-entry key shared by both fact-similarity backends: strategy
/// identity is the contract, not the backend.
pub const FACT_SIMILARITY_SEARCH: &str = "fact-similarity-search";
/// Result-entry key for [`FactExpansion`].
pub const EXPANDED_FACTS: &str = "expanded-facts";

/// Graph-native ANN search over fact embeddings.
///
/// Over-fetches 3x the requested top-k: the label filter and the
/// chunk/source join can discard candidates.
pub struct GraphFactSimilaritySearch {
    graph: Arc<dyn IGraphClient>,
    top_k: usize,
}

impl GraphFactSimilaritySearch {
    pub fn new(graph: Arc<dyn IGraphClient>, top_k: usize) -> Self {
        Self { graph, top_k }
    }

    fn query(&self) -> String {
        format!(
            "CALL graph.vectors.topKByEmbedding($embedding, {{topK: {over_fetch}, concurrency: 4}})\n\
             YIELD node, score\n\
             WITH node AS fact, score WHERE 'Fact' IN labels(fact)\n\
             MATCH (fact)-[:CHUNK]->(chunk:Chunk)-[:SOURCE]->(source:Source)\n\
             RETURN {{\n    score: score,\n    {fact},\n    {source},\n    {chunk}\n}} \
             AS result ORDER BY result.score ASC LIMIT {top_k}",
            over_fetch = self.top_k * 3,
            fact = node_result("fact"),
            source = node_result("source"),
            chunk = node_result_with("chunk", &["chunkId"]),
            top_k = self.top_k,
        )
    }
}

impl Strategy for GraphFactSimilaritySearch {
    fn name(&self) -> &'static str {
        FACT_SIMILARITY_SEARCH
    }

    fn accept(&self, mut context: QaContext) -> PrismResult<QaContext> {
        let mut params = Map::new();
        params.insert(
            "embedding".to_string(),
            json!(context.user_context().question_embedding()),
        );

        let rows = self.graph.execute(&self.query(), params)?;
        let results: Vec<Value> = rows
            .into_iter()
            .filter_map(|row| row.get("result").cloned())
            .collect();

        debug!(facts = results.len(), "graph fact similarity search complete");
        context.append(FACT_SIMILARITY_SEARCH, results);
        Ok(context)
    }
}

/// Fact similarity via an external vector index.
///
/// Same record shape and result-entry key as the graph-native backend.
pub struct IndexFactSimilaritySearch {
    index: Arc<dyn IVectorIndex>,
    top_k: usize,
}

impl IndexFactSimilaritySearch {
    pub fn new(index: Arc<dyn IVectorIndex>, top_k: usize) -> Self {
        Self { index, top_k }
    }
}

impl Strategy for IndexFactSimilaritySearch {
    fn name(&self) -> &'static str {
        FACT_SIMILARITY_SEARCH
    }

    fn accept(&self, mut context: QaContext) -> PrismResult<QaContext> {
        let results = self
            .index
            .search(context.user_context().question_embedding(), self.top_k)?;

        debug!(facts = results.len(), "index fact similarity search complete");
        context.append(FACT_SIMILARITY_SEARCH, results);
        Ok(context)
    }
}

/// Frontier-bounded breadth-first walk outward from similar facts.
///
/// Alternates a cheap structural filter (at most `frontier_size` candidates
/// reachable through shared entities and a scored relation edge) with a
/// semantic re-score (mean squared L2 distance to the seed embedding), so
/// context widens without a pure nearest-neighbor search exploding.
pub struct FactExpansion {
    graph: Arc<dyn IGraphClient>,
    top_k: usize,
    frontier_size: usize,
    max_depth: usize,
    sources: Vec<&'static str>,
}

impl FactExpansion {
    pub fn new(
        graph: Arc<dyn IGraphClient>,
        top_k: usize,
        frontier_size: usize,
        max_depth: usize,
    ) -> Self {
        Self {
            graph,
            top_k,
            frontier_size,
            max_depth,
            sources: vec![FACT_SIMILARITY_SEARCH],
        }
    }

    pub fn with_sources(mut self, sources: Vec<&'static str>) -> Self {
        self.sources = sources;
        self
    }

    fn query(&self) -> String {
        format!(
            "MATCH (sourceFact:Fact)<-[:OBJECT]-(e1:Entity)-[:SUBJECT]->(fact:Fact)\
             <-[:OBJECT]-(e2:Entity)<-[r:RELATION]-(e1),\n\
             (fact)-[:CHUNK]->(chunk:Chunk)-[:SOURCE]->(source:Source)\n\
             WHERE sourceFact.factId IN $node_ids AND sourceFact <> fact\n\
             WITH DISTINCT sourceFact, fact, chunk, source, r.score AS score \
             ORDER BY score DESC LIMIT {frontier_size}\n\
             CALL graph.vectors.get(fact)\n\
             YIELD embedding\n\
             RETURN {{\n    {source_fact},\n    {fact},\n    {chunk},\n    {source},\n    \
             embedding: embedding,\n    score: score\n}} AS result",
            frontier_size = self.frontier_size,
            source_fact = node_result("sourceFact"),
            fact = node_result("fact"),
            chunk = node_result_with("chunk", &["chunkId"]),
            source = node_result("source"),
        )
    }

    /// One structural-then-semantic step: fetch up to `frontier_size`
    /// connected candidates, score against the seed embeddings, keep the
    /// `top_k` highest-scoring.
    fn top_k_facts(
        &self,
        seed_embeddings: &[Vec<f32>],
        node_ids: &[String],
    ) -> PrismResult<Vec<Value>> {
        if node_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = Map::new();
        params.insert("node_ids".to_string(), json!(node_ids));

        let rows = self.graph.execute(&self.query(), params)?;

        let mut candidates: Vec<Value> = Vec::new();
        for row in rows {
            let Some(result) = row.get("result") else {
                continue;
            };
            let Some(embedding) = number_vec(result.get("embedding")) else {
                continue;
            };

            let score = mean_squared_l2(seed_embeddings, &embedding);
            candidates.push(json!({
                "fact": result.get("fact").cloned().unwrap_or(Value::Null),
                "sourceFact": result.get("sourceFact").cloned().unwrap_or(Value::Null),
                "source": result.get("source").cloned().unwrap_or(Value::Null),
                "chunk": result.get("chunk").cloned().unwrap_or(Value::Null),
                "score": score,
            }));
        }

        candidates.sort_by(|a, b| {
            score_of(b)
                .partial_cmp(&score_of(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(self.top_k);

        Ok(candidates)
    }
}

impl Strategy for FactExpansion {
    fn name(&self) -> &'static str {
        EXPANDED_FACTS
    }

    fn accept(&self, mut context: QaContext) -> PrismResult<QaContext> {
        let seed_embeddings = vec![context.user_context().question_embedding().to_vec()];
        let selector = Selector::parse("fact/factId");

        let mut frontier: Vec<String> = context
            .select(&self.sources, &selector)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect();

        let mut results: Vec<Value> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for depth in 0..self.max_depth {
            let candidates = self.top_k_facts(&seed_embeddings, &frontier)?;

            let new_facts: Vec<Value> = candidates
                .into_iter()
                .filter(|candidate| {
                    candidate
                        .pointer("/fact/factId")
                        .and_then(Value::as_str)
                        .map(|id| !seen.contains(id))
                        .unwrap_or(false)
                })
                .collect();

            if new_facts.is_empty() {
                debug!(depth, "expansion frontier exhausted");
                break;
            }

            frontier = new_facts
                .iter()
                .filter_map(|fact| fact.pointer("/fact/factId").and_then(Value::as_str))
                .map(String::from)
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            seen.extend(frontier.iter().cloned());
            results.extend(new_facts);
        }

        debug!(facts = results.len(), "fact expansion complete");
        context.append(EXPANDED_FACTS, results);
        Ok(context)
    }
}

fn score_of(record: &Value) -> f64 {
    record
        .get("score")
        .and_then(Value::as_f64)
        .unwrap_or(f64::NEG_INFINITY)
}

fn number_vec(value: Option<&Value>) -> Option<Vec<f32>> {
    let array = value?.as_array()?;
    array
        .iter()
        .map(|n| n.as_f64().map(|f| f as f32))
        .collect()
}

/// Squared L2 distance. Only relative ordering matters downstream, so the
/// square root is skipped.
fn squared_l2(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum()
}

fn mean_squared_l2(seeds: &[Vec<f32>], candidate: &[f32]) -> f64 {
    if seeds.is_empty() {
        return 0.0;
    }
    seeds
        .iter()
        .map(|seed| squared_l2(seed, candidate))
        .sum::<f64>()
        / seeds.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_l2_skips_the_square_root() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn mean_over_multiple_seeds() {
        let seeds = vec![vec![0.0], vec![2.0]];
        // Distances squared are 1 and 1, mean 1.
        assert_eq!(mean_squared_l2(&seeds, &[1.0]), 1.0);
    }
}
