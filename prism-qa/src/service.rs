//! Top-level dispatcher: classify, route, answer.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use prism_core::config::{PrismConfig, RetrievalConfig};
use prism_core::errors::PrismResult;
use prism_core::models::{QaAnswer, QueryOutcome, Subgraph};
use prism_core::traits::{ICompletionProvider, IEmbeddingProvider, IGraphClient};
use prism_graph::HttpGraphClient;
use prism_llm::{HttpCompletionClient, HttpEmbeddingClient, RetryPolicy};
use prism_retrieval::context::{QaContext, UserContext};
use prism_retrieval::pipeline::Pipeline;
use prism_retrieval::response::QaResponse;
use serde_json::Value;
use tracing::info;

use crate::classifier::{QueryType, QuestionClassifier};
use crate::nlq::NlQueryTranslator;
use crate::queries;

/// User-visible fallback for question shapes the service cannot execute.
pub const UNSUPPORTED_MESSAGE: &str = "The information you requested is not currently supported \
by this application. Please try again.";

const VULNERABILITY_LABEL: &str = "Vulnerability";
const SIMILAR_TOP_K: usize = 10;
const VULNERABILITY_LIST_TTL: Duration = Duration::from_secs(300);
const VULNERABILITY_LIST_KEY: &str = "vulnerabilities";

/// The query-answering service.
///
/// Collaborators are injected once at construction; each query gets its own
/// context, so concurrent questions share nothing but the clients.
pub struct QaService {
    graph: Arc<dyn IGraphClient>,
    embedder: Arc<dyn IEmbeddingProvider>,
    completion: Arc<dyn ICompletionProvider>,
    retrieval: RetrievalConfig,
    classifier: QuestionClassifier,
    nlq: NlQueryTranslator,
    vulnerability_cache: Cache<String, Vec<String>>,
}

impl QaService {
    pub fn new(
        graph: Arc<dyn IGraphClient>,
        embedder: Arc<dyn IEmbeddingProvider>,
        completion: Arc<dyn ICompletionProvider>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            classifier: QuestionClassifier::new(completion.clone()),
            nlq: NlQueryTranslator::new(graph.clone(), completion.clone()),
            vulnerability_cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(VULNERABILITY_LIST_TTL)
                .build(),
            graph,
            embedder,
            completion,
            retrieval,
        }
    }

    /// Wire the production HTTP clients from configuration.
    pub fn from_config(config: &PrismConfig) -> PrismResult<Self> {
        let retry = RetryPolicy::from_config(&config.retry);
        let graph = Arc::new(HttpGraphClient::new(&config.graph)?);
        let embedder = Arc::new(HttpEmbeddingClient::new(&config.embedding, retry.clone())?);
        let completion = Arc::new(HttpCompletionClient::new(&config.completion, retry)?);
        Ok(Self::new(graph, embedder, completion, config.retrieval.clone()))
    }

    /// All vulnerability ids, cached briefly for selector-style UIs.
    pub fn vulnerability_ids(&self) -> PrismResult<Vec<String>> {
        if let Some(ids) = self.vulnerability_cache.get(VULNERABILITY_LIST_KEY) {
            return Ok(ids);
        }
        let ids = queries::vulnerability_ids(self.graph.as_ref())?;
        self.vulnerability_cache
            .insert(VULNERABILITY_LIST_KEY.to_string(), ids.clone());
        Ok(ids)
    }

    /// Ranked similar vulnerabilities for a seed id, ascending by distance,
    /// seed excluded.
    pub fn similar_vulnerabilities(&self, id: &str, top_k: usize) -> PrismResult<Vec<Value>> {
        queries::similar_vulnerabilities(self.graph.as_ref(), id, top_k)
    }

    /// The similarity neighborhood of a vulnerability in the display format.
    pub fn vulnerability_subgraph(&self, id: &str) -> PrismResult<Subgraph> {
        queries::vulnerability_subgraph(self.graph.as_ref(), id)
    }

    /// NL-to-openCypher rows, or the unsupported fallback.
    pub fn natural_language_query(&self, question: &str) -> PrismResult<QueryOutcome> {
        Ok(match self.nlq.run(question)? {
            Some(rows) => QueryOutcome::Rows(rows),
            None => QueryOutcome::Unsupported(UNSUPPORTED_MESSAGE.to_string()),
        })
    }

    /// The full GraphRAG pipeline: embed the question, run the standard
    /// strategy chain, synthesize a cited answer.
    pub fn answer_question(&self, question: &str) -> PrismResult<QaAnswer> {
        let user_context = UserContext::new(question, self.embedder.as_ref())?;
        let context = QaContext::new(user_context);

        let pipeline = Pipeline::standard(
            self.graph.clone(),
            self.completion.clone(),
            &self.retrieval,
        );
        let context = pipeline.run(context)?;

        let response = QaResponse::new(self.completion.clone()).generate_response(&context)?;
        Ok(response.into_qa_answer())
    }

    /// Classify the question and dispatch to the matching execution path.
    pub fn run(&self, question: &str) -> PrismResult<QueryOutcome> {
        let query_type = self.classifier.classify(question)?;
        info!(?query_type, "dispatching question");

        match query_type {
            QueryType::KnowledgeGraph => self.natural_language_query(question),
            QueryType::Rag | QueryType::GraphRag => {
                let labels = queries::node_labels(self.graph.as_ref())?;
                let Some(target) = self.classifier.extract_target(question, &labels)? else {
                    return Ok(QueryOutcome::Unsupported(UNSUPPORTED_MESSAGE.to_string()));
                };

                if target.label != VULNERABILITY_LABEL {
                    return Ok(QueryOutcome::Unsupported(UNSUPPORTED_MESSAGE.to_string()));
                }

                if query_type == QueryType::Rag {
                    Ok(QueryOutcome::Rows(
                        self.similar_vulnerabilities(&target.id, SIMILAR_TOP_K)?,
                    ))
                } else {
                    Ok(QueryOutcome::Subgraph(
                        self.vulnerability_subgraph(&target.id)?,
                    ))
                }
            }
            QueryType::Unknown => Ok(QueryOutcome::Unsupported(UNSUPPORTED_MESSAGE.to_string())),
        }
    }
}
