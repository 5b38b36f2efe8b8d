//! Natural-language to openCypher translation.
//!
//! A translation the model refuses ("I don't know") or a generated query
//! the store rejects is an unsupported question shape, not an error.

use std::sync::Arc;

use prism_core::errors::PrismResult;
use prism_core::models::PromptTemplate;
use prism_core::traits::{ICompletionProvider, IGraphClient};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::prompts;
use crate::queries;

pub struct NlQueryTranslator {
    graph: Arc<dyn IGraphClient>,
    completion: Arc<dyn ICompletionProvider>,
    template: PromptTemplate,
}

impl NlQueryTranslator {
    pub fn new(graph: Arc<dyn IGraphClient>, completion: Arc<dyn ICompletionProvider>) -> Self {
        Self {
            graph,
            completion,
            template: PromptTemplate::new(prompts::NL_QUERY_PROMPT),
        }
    }

    /// Translate and execute. `None` means the question shape is
    /// unsupported.
    pub fn run(&self, question: &str) -> PrismResult<Option<Vec<Value>>> {
        let labels = queries::node_labels(self.graph.as_ref())?.join(", ");
        let response = self.completion.complete(
            &self.template,
            &[("question", question), ("labels", labels.as_str())],
        )?;

        let query = strip_fences(&response);
        if query.is_empty() || query.eq_ignore_ascii_case("i don't know") {
            debug!("model declined to translate the question");
            return Ok(None);
        }

        match self.graph.execute(query, Map::new()) {
            Ok(rows) => Ok(Some(rows)),
            Err(err) => {
                warn!(error = %err, "generated query failed to execute");
                Ok(None)
            }
        }
    }
}

/// Models sometimes wrap the query in a code fence.
fn strip_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```cypher")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
