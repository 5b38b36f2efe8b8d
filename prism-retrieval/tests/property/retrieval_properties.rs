//! Property tests for the pipeline's ordering and bounding contracts.

use std::sync::Arc;

use test_fixtures::*;
use prism_retrieval::context::{QaContext, UserContext};
use prism_retrieval::selector::Selector;
use prism_retrieval::strategies::chunks::{RerankChunks, CHUNK_SIMILARITY_SEARCH, RERANKED_CHUNKS};
use prism_retrieval::strategies::facts::{FactExpansion, EXPANDED_FACTS, FACT_SIMILARITY_SEARCH};
use prism_retrieval::strategy::Strategy;
use proptest::prelude::*;
use serde_json::{json, Value};

fn context() -> QaContext {
    QaContext::new(UserContext::with_embedding("q", vec![0.0, 0.0]))
}

// ── Selector: presence semantics over arbitrary two-level records ─────────

proptest! {
    #[test]
    fn selector_resolves_iff_path_is_present(
        outer in "[a-z]{1,8}",
        inner in "[a-z]{1,8}",
        value in "[a-z0-9]{0,12}",
    ) {
        let record = json!({ (outer.as_str()): { (inner.as_str()): value.clone() } });
        let matching = Selector::parse(&format!("{outer}/{inner}"));
        prop_assert_eq!(matching.resolve(&record), Some(&json!(value)));

        let missing = Selector::parse(&format!("{outer}_x/{inner}"));
        prop_assert_eq!(missing.resolve(&record), None);
    }
}

proptest! {
    #[test]
    fn selector_alternatives_are_order_independent_of_producer_shape(
        id in "[a-z0-9]{1,12}",
        is_fact in any::<bool>(),
    ) {
        let record = if is_fact {
            json!({"fact": {"factId": id.clone()}})
        } else {
            json!({"entity": {"entityId": id.clone()}})
        };
        let selector = Selector::parse("fact|entity/factId|entityId");
        prop_assert_eq!(selector.resolve(&record), Some(&json!(id)));
    }
}

// ── RerankChunks: ordering and merge invariants ───────────────────────────

proptest! {
    #[test]
    fn rerank_output_is_sorted_descending_and_never_grows(
        scores in prop::collection::vec(0.01f64..100.0, 0..20),
    ) {
        let records: Vec<Value> = scores
            .iter()
            .enumerate()
            .map(|(i, score)| chunk_record(&format!("c{i}"), *score))
            .collect();
        let input_len = records.len();

        let mut ctx = context();
        ctx.append(CHUNK_SIMILARITY_SEARCH, records);
        let ctx = RerankChunks::new().accept(ctx).unwrap();

        let output: Vec<f64> = ctx
            .results_for(&[RERANKED_CHUNKS])
            .iter()
            .filter_map(|r| r.get("score").and_then(Value::as_f64))
            .collect();

        prop_assert!(output.len() <= input_len);
        prop_assert!(output.windows(2).all(|w| w[0] >= w[1]));
    }
}

proptest! {
    #[test]
    fn rerank_collisions_merge_to_one_record_per_chunk(
        scores in prop::collection::vec(0.01f64..100.0, 1..20),
        distinct_chunks in 1usize..5,
    ) {
        let records: Vec<Value> = scores
            .iter()
            .enumerate()
            .map(|(i, score)| chunk_record(&format!("c{}", i % distinct_chunks), *score))
            .collect();

        let mut ctx = context();
        ctx.append(CHUNK_SIMILARITY_SEARCH, records);
        let ctx = RerankChunks::new().accept(ctx).unwrap();

        let output = ctx.results_for(&[RERANKED_CHUNKS]);
        prop_assert_eq!(output.len(), distinct_chunks.min(scores.len()));
    }
}

// ── FactExpansion: iteration bound ────────────────────────────────────────

proptest! {
    #[test]
    fn expansion_iterations_never_exceed_max_depth(max_depth in 0usize..6) {
        // Endless novelty: every walk yields a fresh fact.
        let responses: Vec<Vec<Value>> = (0..10)
            .map(|i| vec![expansion_row(&format!("nf{i}"), "f1", vec![1.0, 1.0], 0.9)])
            .collect();
        let graph = Arc::new(FakeGraph::new(responses));

        let mut ctx = context();
        ctx.append(
            FACT_SIMILARITY_SEARCH,
            vec![fact_record("f1", "seed", "c1", 0.1)],
        );

        let ctx = FactExpansion::new(graph.clone(), 5, 20, max_depth)
            .accept(ctx)
            .unwrap();

        prop_assert_eq!(graph.call_count(), max_depth);
        prop_assert_eq!(ctx.results_for(&[EXPANDED_FACTS]).len(), max_depth);
    }
}
