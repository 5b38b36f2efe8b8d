//! Scripted fakes and record builders for exercising the pipeline without
//! external services, shared by tests across crates.

use std::collections::VecDeque;
use std::sync::Mutex;

use prism_core::errors::PrismResult;
use prism_core::models::PromptTemplate;
use prism_core::traits::{
    EmbedMode, ICompletionProvider, IEmbeddingProvider, IGraphClient, IVectorIndex,
};
use serde_json::{json, Map, Value};

/// Graph client returning scripted responses in call order; records every
/// call. An exhausted script returns empty result sets.
#[derive(Default)]
pub struct FakeGraph {
    responses: Mutex<VecDeque<Vec<Value>>>,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl FakeGraph {
    pub fn new(responses: Vec<Vec<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_query(&self, index: usize) -> String {
        self.calls.lock().unwrap()[index].0.clone()
    }

    pub fn call_params(&self, index: usize) -> Map<String, Value> {
        self.calls.lock().unwrap()[index].1.clone()
    }
}

impl IGraphClient for FakeGraph {
    fn execute(&self, query: &str, parameters: Map<String, Value>) -> PrismResult<Vec<Value>> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), parameters));
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// Completion provider returning scripted responses in call order.
#[derive(Default)]
pub struct FakeCompletion {
    responses: Mutex<VecDeque<String>>,
}

impl FakeCompletion {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
        }
    }
}

impl ICompletionProvider for FakeCompletion {
    fn complete(&self, _template: &PromptTemplate, _vars: &[(&str, &str)]) -> PrismResult<String> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "fake-completion"
    }
}

/// Embedding provider returning one fixed vector for every input.
pub struct FakeEmbedder(pub Vec<f32>);

impl IEmbeddingProvider for FakeEmbedder {
    fn embed(&self, _text: &str, _mode: EmbedMode) -> PrismResult<Vec<f32>> {
        Ok(self.0.clone())
    }

    fn dimensions(&self) -> usize {
        self.0.len()
    }

    fn name(&self) -> &str {
        "fake-embedder"
    }
}

/// Vector index returning one scripted result set.
pub struct FakeIndex(pub Vec<Value>);

impl IVectorIndex for FakeIndex {
    fn search(&self, _embedding: &[f32], _top_k: usize) -> PrismResult<Vec<Value>> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Record builders matching the strategies' wire shapes
// ---------------------------------------------------------------------------

/// A `{"result": ...}` row as the graph endpoint returns it.
pub fn row(result: Value) -> Value {
    json!({ "result": result })
}

/// A fact-similarity record.
pub fn fact_record(fact_id: &str, value: &str, chunk_id: &str, score: f64) -> Value {
    json!({
        "score": score,
        "fact": {"factId": fact_id, "value": value},
        "chunk": {"chunkId": chunk_id},
        "source": {"sourceId": format!("src-{fact_id}"), "url": format!("https://example.com/{fact_id}")},
    })
}

/// A chunk-similarity record.
pub fn chunk_record(chunk_id: &str, score: f64) -> Value {
    json!({
        "score": score,
        "chunk": {"chunkId": chunk_id},
        "source": {"sourceId": format!("src-{chunk_id}")},
    })
}

/// A hydrated chunk record as `GetChunks` returns it.
pub fn full_chunk_record(chunk_id: &str, text: &str, source: &str) -> Value {
    json!({
        "chunk": {"chunkId": chunk_id, "value": text},
        "source": {"sourceId": source, "file_path": format!("{source}.json")},
    })
}

/// An expansion-candidate row, embedding included.
pub fn expansion_row(
    fact_id: &str,
    source_fact_id: &str,
    embedding: Vec<f32>,
    edge_score: f64,
) -> Value {
    row(json!({
        "sourceFact": {"factId": source_fact_id, "value": format!("seed {source_fact_id}")},
        "fact": {"factId": fact_id, "value": format!("fact {fact_id}")},
        "chunk": {"chunkId": format!("chunk-{fact_id}")},
        "source": {"sourceId": format!("src-{fact_id}")},
        "embedding": embedding,
        "score": edge_score,
    }))
}

/// An entity row as `KeywordSearch` receives it.
pub fn entity_row(entity_id: &str, value: &str) -> Value {
    row(json!({
        "entity": {"entityId": entity_id, "value": value},
    }))
}

/// A community row.
pub fn community_row(community_id: &str, value: &str) -> Value {
    row(json!({
        "community": {"communityId": community_id, "value": value},
    }))
}

/// A vulnerability similarity row (`id`, `description`, `score` aliases).
pub fn vulnerability_row(id: &str, score: f64) -> Value {
    json!({
        "id": id,
        "description": format!("description of {id}"),
        "score": score,
    })
}
