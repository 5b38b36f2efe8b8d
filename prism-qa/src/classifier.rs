//! Question-type classification and target extraction from completions.
//!
//! Completion output is inherently unreliable here: unrecognized labels and
//! wrong line counts map to explicit `Unknown`/`None`, never to errors.

use std::sync::Arc;

use prism_core::errors::PrismResult;
use prism_core::models::PromptTemplate;
use prism_core::traits::ICompletionProvider;
use tracing::debug;

use crate::prompts;

/// How a question should be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// Answerable with a graph query alone.
    KnowledgeGraph,
    /// Answerable with similarity search alone.
    Rag,
    /// Needs both graph structure and similarity search.
    GraphRag,
    /// The classifier could not place the question.
    Unknown,
}

/// The SBOM element a question targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTarget {
    pub label: String,
    pub id: String,
}

/// Completion-backed question classification.
pub struct QuestionClassifier {
    completion: Arc<dyn ICompletionProvider>,
    classify_template: PromptTemplate,
    target_template: PromptTemplate,
}

impl QuestionClassifier {
    pub fn new(completion: Arc<dyn ICompletionProvider>) -> Self {
        Self {
            completion,
            classify_template: PromptTemplate::new(prompts::CLASSIFY_QUESTION_PROMPT),
            target_template: PromptTemplate::new(prompts::EXTRACT_TARGET_PROMPT),
        }
    }

    /// One completion call mapping the question to a query type.
    pub fn classify(&self, question: &str) -> PrismResult<QueryType> {
        let response = self
            .completion
            .complete(&self.classify_template, &[("question", question)])?;

        let label = response.trim().to_lowercase();
        let query_type = match label.as_str() {
            "database" => QueryType::KnowledgeGraph,
            "document" => QueryType::Rag,
            "both" => QueryType::GraphRag,
            _ => QueryType::Unknown,
        };

        debug!(%label, ?query_type, "classified question");
        Ok(query_type)
    }

    /// Extract the element label and id a question asks about.
    ///
    /// The prompt requires exactly two lines; anything else, or a label the
    /// graph does not know, yields `None`.
    pub fn extract_target(
        &self,
        question: &str,
        known_labels: &[String],
    ) -> PrismResult<Option<QueryTarget>> {
        let response = self
            .completion
            .complete(&self.target_template, &[("question", question)])?;

        let lines: Vec<&str> = response.trim().lines().map(str::trim).collect();
        if lines.len() != 2 {
            debug!(lines = lines.len(), "target extraction returned wrong line count");
            return Ok(None);
        }

        let label = lines[0];
        if !known_labels.iter().any(|known| known == label) {
            debug!(%label, "target extraction returned unknown label");
            return Ok(None);
        }

        Ok(Some(QueryTarget {
            label: label.to_string(),
            id: lines[1].to_string(),
        }))
    }
}
