//! Per-query contexts: the immutable user question and the append-only
//! result log shared by every strategy.

use prism_core::errors::PrismResult;
use prism_core::traits::{EmbedMode, IEmbeddingProvider};
use serde::Serialize;
use serde_json::Value;

use crate::selector::Selector;

/// The raw question plus its embedding, computed once at construction.
#[derive(Debug, Clone, Serialize)]
pub struct UserContext {
    question: String,
    question_embedding: Vec<f32>,
}

impl UserContext {
    /// Embed the question and freeze it.
    pub fn new(question: impl Into<String>, embedder: &dyn IEmbeddingProvider) -> PrismResult<Self> {
        let question = question.into();
        let question_embedding = embedder.embed(&question, EmbedMode::Text)?;
        Ok(Self {
            question,
            question_embedding,
        })
    }

    /// Construct from a precomputed embedding (replays, tests).
    pub fn with_embedding(question: impl Into<String>, question_embedding: Vec<f32>) -> Self {
        Self {
            question: question.into(),
            question_embedding,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn question_embedding(&self) -> &[f32] {
        &self.question_embedding
    }
}

/// One strategy's appended output.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry {
    pub key: String,
    pub results: Vec<Value>,
}

/// Append-only ledger of named result sets for one query.
///
/// The entries form a log: later strategies replay earlier output by key,
/// and a key may appear more than once; reads aggregate across all
/// matching entries. The API exposes only append and read-by-key, so no
/// strategy can rewrite another strategy's prior entry.
#[derive(Debug, Clone, Serialize)]
pub struct QaContext {
    user_context: UserContext,
    results: Vec<ResultEntry>,
}

impl QaContext {
    pub fn new(user_context: UserContext) -> Self {
        Self {
            user_context,
            results: Vec::new(),
        }
    }

    pub fn user_context(&self) -> &UserContext {
        &self.user_context
    }

    /// Append a result set under `key`. The only mutation the log allows.
    pub fn append(&mut self, key: impl Into<String>, results: Vec<Value>) {
        self.results.push(ResultEntry {
            key: key.into(),
            results,
        });
    }

    /// All records across entries matching `keys`, in key-list order.
    pub fn results_for(&self, keys: &[&str]) -> Vec<&Value> {
        let mut all = Vec::new();
        for key in keys {
            for entry in self.results.iter().filter(|e| e.key == *key) {
                all.extend(entry.results.iter());
            }
        }
        all
    }

    /// Per-record selector resolution over [`Self::results_for`].
    ///
    /// Absent paths yield `None` rather than being dropped, so callers can
    /// distinguish "value absent" from "no matching record".
    pub fn select<'a>(&'a self, keys: &[&str], selector: &Selector) -> Vec<Option<&'a Value>> {
        self.results_for(keys)
            .into_iter()
            .map(|record| selector.resolve(record))
            .collect()
    }

    /// Entries in append order, for inspection.
    pub fn entries(&self) -> &[ResultEntry] {
        &self.results
    }

    /// JSON rendering of the full log, for inspection.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> QaContext {
        QaContext::new(UserContext::with_embedding("q", vec![0.0, 1.0]))
    }

    #[test]
    fn results_for_returns_only_matching_keys() {
        let mut ctx = context();
        ctx.append("a", vec![json!(1), json!(2)]);
        ctx.append("b", vec![json!(3)]);

        let a = ctx.results_for(&["a"]);
        assert_eq!(a, vec![&json!(1), &json!(2)]);
        assert!(ctx.results_for(&["missing"]).is_empty());
    }

    #[test]
    fn aggregation_follows_key_list_order() {
        let mut ctx = context();
        ctx.append("a", vec![json!("a1")]);
        ctx.append("b", vec![json!("b1")]);

        let merged = ctx.results_for(&["b", "a"]);
        assert_eq!(merged, vec![&json!("b1"), &json!("a1")]);
    }

    #[test]
    fn repeated_keys_aggregate_across_entries() {
        let mut ctx = context();
        ctx.append("a", vec![json!(1)]);
        ctx.append("a", vec![json!(2)]);

        assert_eq!(ctx.results_for(&["a"]), vec![&json!(1), &json!(2)]);
        assert_eq!(ctx.entries().len(), 2);
    }

    #[test]
    fn select_keeps_absent_values_as_none() {
        let mut ctx = context();
        ctx.append(
            "facts",
            vec![json!({"fact": {"factId": "f1"}}), json!({"other": 1})],
        );

        let selected = ctx.select(&["facts"], &Selector::parse("fact/factId"));
        assert_eq!(selected, vec![Some(&json!("f1")), None]);
    }
}
