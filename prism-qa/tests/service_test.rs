//! Dispatcher and routing behavior over scripted collaborators.

use std::sync::Arc;

use prism_core::config::RetrievalConfig;
use prism_core::errors::{GraphError, PrismResult};
use prism_core::models::QueryOutcome;
use prism_core::traits::IGraphClient;
use prism_qa::classifier::{QueryType, QuestionClassifier};
use prism_qa::service::UNSUPPORTED_MESSAGE;
use prism_qa::QaService;
use serde_json::{json, Map, Value};
use test_fixtures::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn labels_row() -> Vec<Value> {
    vec![json!({"labels": ["Vulnerability", "Component"]})]
}

fn service(graph: FakeGraph, completions: Vec<&str>) -> QaService {
    QaService::new(
        Arc::new(graph),
        Arc::new(FakeEmbedder(vec![0.0, 0.0])),
        Arc::new(FakeCompletion::new(completions)),
        RetrievalConfig::default(),
    )
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[test]
fn classifier_maps_known_labels_and_defaults_to_unknown() {
    for (answer, expected) in [
        ("database", QueryType::KnowledgeGraph),
        ("Document", QueryType::Rag),
        (" both ", QueryType::GraphRag),
        ("i don't know", QueryType::Unknown),
        ("gibberish", QueryType::Unknown),
    ] {
        let classifier = QuestionClassifier::new(Arc::new(FakeCompletion::new(vec![answer])));
        assert_eq!(classifier.classify("q").unwrap(), expected, "{answer}");
    }
}

#[test]
fn target_extraction_requires_exactly_two_lines_and_a_known_label() {
    let labels = vec!["Vulnerability".to_string(), "Component".to_string()];

    let one_line = QuestionClassifier::new(Arc::new(FakeCompletion::new(vec!["Vulnerability"])));
    assert_eq!(one_line.extract_target("q", &labels).unwrap(), None);

    let three_lines = QuestionClassifier::new(Arc::new(FakeCompletion::new(vec![
        "Vulnerability\nCVE-1\nextra",
    ])));
    assert_eq!(three_lines.extract_target("q", &labels).unwrap(), None);

    let unknown_label =
        QuestionClassifier::new(Arc::new(FakeCompletion::new(vec!["Package\nCVE-1"])));
    assert_eq!(unknown_label.extract_target("q", &labels).unwrap(), None);

    let good = QuestionClassifier::new(Arc::new(FakeCompletion::new(vec![
        "Vulnerability\nCVE-2023-1234",
    ])));
    let target = good.extract_target("q", &labels).unwrap().unwrap();
    assert_eq!(target.label, "Vulnerability");
    assert_eq!(target.id, "CVE-2023-1234");
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn unknown_question_type_is_unsupported() {
    let service = service(FakeGraph::new(vec![]), vec!["no idea"]);
    match service.run("what is the meaning of life?").unwrap() {
        QueryOutcome::Unsupported(message) => assert_eq!(message, UNSUPPORTED_MESSAGE),
        other => panic!("expected Unsupported, got {other:?}"),
    }
}

#[test]
fn similarity_question_routes_to_ranked_vulnerabilities() {
    init_tracing();

    // One seeded vulnerability with similarity edges to two others; the
    // ranked list excludes the seed, ascending by score.
    let graph = FakeGraph::new(vec![
        labels_row(),
        vec![
            vulnerability_row("CVE-2023-2000", 0.1),
            vulnerability_row("CVE-2023-3000", 0.4),
        ],
    ]);
    let service = service(
        graph,
        vec!["document", "Vulnerability\nCVE-2023-1234"],
    );

    let outcome = service
        .run("What Vulnerabilities are similar to 'CVE-2023-1234'?")
        .unwrap();

    let QueryOutcome::Rows(rows) = outcome else {
        panic!("expected Rows");
    };
    let ids: Vec<&str> = rows
        .iter()
        .filter_map(|row| row.get("id").and_then(Value::as_str))
        .collect();
    assert_eq!(ids, vec!["CVE-2023-2000", "CVE-2023-3000"]);
    assert!(!ids.contains(&"CVE-2023-1234"));
}

#[test]
fn similarity_query_excludes_the_seed_and_bounds_top_k() {
    let graph = Arc::new(FakeGraph::new(vec![labels_row(), vec![]]));
    let service = QaService::new(
        graph.clone(),
        Arc::new(FakeEmbedder(vec![0.0])),
        Arc::new(FakeCompletion::new(vec![
            "document",
            "Vulnerability\nCVE-2023-1234",
        ])),
        RetrievalConfig::default(),
    );

    service.run("similar to CVE-2023-1234?").unwrap();

    let query = graph.call_query(1);
    assert!(query.contains("WHERE node <> n"));
    assert!(query.contains("ORDER BY score ASC LIMIT 10"));
    assert_eq!(graph.call_params(1)["id"], json!("CVE-2023-1234"));
}

#[test]
fn graph_rag_question_routes_to_the_display_subgraph() {
    let node = json!({
        "~id": "n1",
        "~labels": ["Vulnerability"],
        "~properties": {"id": "CVE-2023-1234"}
    });
    let edge = json!({"~start": "n1", "~end": "n2", "~type": "AFFECTS"});
    let graph = FakeGraph::new(vec![
        labels_row(),
        vec![json!({"nodes": [node]})],
        vec![json!({"edges": [edge]})],
    ]);
    let service = service(
        graph,
        vec!["both", "Vulnerability\nCVE-2023-1234"],
    );

    let outcome = service.run("how are they connected?").unwrap();

    let QueryOutcome::Subgraph(subgraph) = outcome else {
        panic!("expected Subgraph");
    };
    assert_eq!(subgraph.nodes.len(), 1);
    assert_eq!(subgraph.nodes[0].labels, vec!["Vulnerability"]);
    assert_eq!(subgraph.edges[0].relation, "AFFECTS");
}

#[test]
fn non_vulnerability_targets_are_unsupported() {
    let graph = FakeGraph::new(vec![labels_row()]);
    let service = service(graph, vec!["document", "Component\nlog4j"]);

    match service.run("what about log4j?").unwrap() {
        QueryOutcome::Unsupported(message) => assert_eq!(message, UNSUPPORTED_MESSAGE),
        other => panic!("expected Unsupported, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// NL query translation
// ---------------------------------------------------------------------------

#[test]
fn nl_query_executes_the_generated_cypher() {
    let graph = FakeGraph::new(vec![labels_row(), vec![json!({"count": 42})]]);
    let service = service(
        graph,
        vec!["database", "MATCH (n:Vulnerability) RETURN count(n) AS count"],
    );

    let QueryOutcome::Rows(rows) = service.run("How many Vulnerabilities exist?").unwrap() else {
        panic!("expected Rows");
    };
    assert_eq!(rows[0]["count"], json!(42));
}

#[test]
fn nl_query_refusal_is_unsupported() {
    let graph = FakeGraph::new(vec![labels_row()]);
    let service = service(graph, vec!["database", "I don't know"]);

    match service.run("something untranslatable").unwrap() {
        QueryOutcome::Unsupported(message) => assert_eq!(message, UNSUPPORTED_MESSAGE),
        other => panic!("expected Unsupported, got {other:?}"),
    }
}

#[test]
fn failing_generated_query_is_unsupported_not_an_error() {
    /// Labels succeed; everything else fails like a store rejecting bad
    /// syntax.
    struct RejectingGraph;

    impl IGraphClient for RejectingGraph {
        fn execute(&self, query: &str, _: Map<String, Value>) -> PrismResult<Vec<Value>> {
            if query.contains("labels(n)") {
                return Ok(vec![json!({"labels": ["Vulnerability"]})]);
            }
            Err(GraphError::QueryFailed {
                reason: "syntax error".to_string(),
            }
            .into())
        }
    }

    let service = QaService::new(
        Arc::new(RejectingGraph),
        Arc::new(FakeEmbedder(vec![0.0])),
        Arc::new(FakeCompletion::new(vec!["database", "NOT A QUERY"])),
        RetrievalConfig::default(),
    );

    match service.run("broken").unwrap() {
        QueryOutcome::Unsupported(message) => assert_eq!(message, UNSUPPORTED_MESSAGE),
        other => panic!("expected Unsupported, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Vulnerability list cache
// ---------------------------------------------------------------------------

#[test]
fn vulnerability_ids_are_cached_between_calls() {
    let graph = Arc::new(FakeGraph::new(vec![
        vec![json!({"id": "CVE-1"}), json!({"id": "CVE-2"})],
        vec![json!({"id": "should-not-be-fetched"})],
    ]));
    let service = QaService::new(
        graph.clone(),
        Arc::new(FakeEmbedder(vec![0.0])),
        Arc::new(FakeCompletion::new(vec![])),
        RetrievalConfig::default(),
    );

    assert_eq!(service.vulnerability_ids().unwrap(), vec!["CVE-1", "CVE-2"]);
    assert_eq!(service.vulnerability_ids().unwrap(), vec!["CVE-1", "CVE-2"]);
    assert_eq!(graph.call_count(), 1);
}

// ---------------------------------------------------------------------------
// GraphRAG answer end to end
// ---------------------------------------------------------------------------

#[test]
fn answer_question_runs_the_full_pipeline_and_splits_the_answer() {
    init_tracing();

    let graph = FakeGraph::new(vec![
        // keyword-search (one keyword).
        vec![entity_row("e1", "log4j")],
        // chunk-similarity-search attempts (first empty, second satisfies).
        vec![],
        vec![row(chunk_record("c1", 0.2))],
        // fact-similarity-search.
        vec![row(fact_record("f1", "app ships log4j 2.14", "c1", 0.1))],
        // expansion walk dries up immediately.
        vec![],
        // chunk hydration.
        vec![row(full_chunk_record("c1", "log4j 2.14 is bundled", "s1"))],
        // communities.
        vec![community_row("com1", "logging stack summary")],
    ]);

    let retrieval = RetrievalConfig {
        chunk_top_k: 1,
        ..Default::default()
    };
    let service = QaService::new(
        Arc::new(graph),
        Arc::new(FakeEmbedder(vec![0.0, 0.0])),
        Arc::new(FakeCompletion::new(vec![
            "Log4j",
            "1. log4j 2.14 is bundled [1]\n\nAnswer: The app bundles log4j 2.14 [1].",
        ])),
        retrieval,
    );

    let answer = service.answer_question("What ships log4j?").unwrap();
    assert_eq!(answer.results, "The app bundles log4j 2.14 .");
    assert!(answer.quotes.contains("[1]"));
}
