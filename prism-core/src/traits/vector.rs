use serde_json::Value;

use crate::errors::PrismResult;

/// External vector-index search substrate.
///
/// Returns fact-shaped records (`{fact, chunk, source, score}`) so the
/// graph-native and external fact-similarity backends stay interchangeable.
pub trait IVectorIndex: Send + Sync {
    fn search(&self, embedding: &[f32], top_k: usize) -> PrismResult<Vec<Value>>;
}
