//! Keyword extraction and keyword-based entity search.

use std::collections::HashSet;
use std::sync::Arc;

use prism_core::errors::PrismResult;
use prism_core::models::PromptTemplate;
use prism_core::traits::{ICompletionProvider, IGraphClient};
use prism_graph::query::{node_id, node_result};
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::QaContext;
use crate::prompts;
use crate::strategy::Strategy;

/// Result-entry key for [`ExtractKeywords`].
pub const EXTRACT_KEYWORDS: &str = "extract-keywords";
/// Result-entry key for [`KeywordSearch`].
pub const KEYWORD_SEARCH: &str = "keyword-search";

/// Extract up to `max_keywords` search keywords from the question with one
/// completion call. The response is `|`-delimited; staying under the limit
/// is the model's responsibility, not enforced here.
pub struct ExtractKeywords {
    completion: Arc<dyn ICompletionProvider>,
    template: PromptTemplate,
    max_keywords: usize,
}

impl ExtractKeywords {
    pub fn new(completion: Arc<dyn ICompletionProvider>, max_keywords: usize) -> Self {
        Self {
            completion,
            template: PromptTemplate::new(prompts::EXTRACT_KEYWORDS_PROMPT),
            max_keywords,
        }
    }
}

impl Strategy for ExtractKeywords {
    fn name(&self) -> &'static str {
        EXTRACT_KEYWORDS
    }

    fn accept(&self, mut context: QaContext) -> PrismResult<QaContext> {
        let max = self.max_keywords.to_string();
        let response = self.completion.complete(
            &self.template,
            &[
                ("text", context.user_context().question()),
                ("max_keywords", max.as_str()),
            ],
        )?;

        let keywords: Vec<Value> = response
            .split('|')
            .map(|keyword| Value::String(keyword.trim().to_string()))
            .collect();

        debug!(count = keywords.len(), "extracted keywords");
        context.append(EXTRACT_KEYWORDS, keywords);
        Ok(context)
    }
}

/// Entity lookup by hashed keyword prefix.
///
/// Each non-empty upstream keyword is normalized and hashed into the
/// entity-id convention, then matched as an id prefix. Entities are
/// deduplicated by id across keywords, first-seen order preserved.
pub struct KeywordSearch {
    graph: Arc<dyn IGraphClient>,
    sources: Vec<&'static str>,
}

impl KeywordSearch {
    pub fn new(graph: Arc<dyn IGraphClient>) -> Self {
        Self::with_sources(graph, vec![EXTRACT_KEYWORDS])
    }

    pub fn with_sources(graph: Arc<dyn IGraphClient>, sources: Vec<&'static str>) -> Self {
        Self { graph, sources }
    }

    fn keywords(&self, context: &QaContext) -> Vec<String> {
        let mut keywords = Vec::new();
        let mut seen = HashSet::new();
        for value in context.results_for(&self.sources) {
            if let Some(keyword) = value.as_str() {
                if seen.insert(keyword.to_string()) {
                    keywords.push(keyword.to_string());
                }
            }
        }
        keywords
    }

    fn query() -> String {
        format!(
            "MATCH (entity:Entity)\n\
             WHERE entity.entityId STARTS WITH $keyword\n\
             RETURN {{\n    {}\n}} AS result",
            node_result("entity")
        )
    }
}

impl Strategy for KeywordSearch {
    fn name(&self) -> &'static str {
        KEYWORD_SEARCH
    }

    fn accept(&self, mut context: QaContext) -> PrismResult<QaContext> {
        let query = Self::query();

        let mut entities: Vec<Value> = Vec::new();
        let mut entity_ids: Vec<String> = Vec::new();

        for keyword in self.keywords(&context) {
            if keyword.is_empty() {
                continue;
            }

            let mut params = Map::new();
            params.insert("keyword".to_string(), Value::String(node_id(&keyword)));

            let rows = self.graph.execute(&query, params)?;
            for row in rows {
                let Some(entity) = row.get("result") else {
                    continue;
                };
                let Some(entity_id) = entity
                    .pointer("/entity/entityId")
                    .and_then(Value::as_str)
                else {
                    continue;
                };
                if !entity_ids.iter().any(|id| id == entity_id) {
                    entity_ids.push(entity_id.to_string());
                    entities.push(entity.clone());
                }
            }
        }

        debug!(entities = entities.len(), "keyword search complete");
        context.append(KEYWORD_SEARCH, entities);
        Ok(context)
    }
}
