//! Answer synthesis: evidence formatting, the grounded-generation call, and
//! citation handling.

use std::sync::Arc;
use std::sync::OnceLock;

use prism_core::errors::PrismResult;
use prism_core::models::{PromptTemplate, QaAnswer};
use prism_core::traits::ICompletionProvider;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::context::QaContext;
use crate::prompts;
use crate::selector::Selector;
use crate::strategies::chunks::CHUNKS;
use crate::strategies::communities::COMMUNITIES;
use crate::strategies::facts::{EXPANDED_FACTS, FACT_SIMILARITY_SEARCH};

/// Property names tried in order for source attribution; upstream data
/// sources are heterogeneous.
const SOURCE_KEYS: [&str; 3] = ["file_path", "url", "source"];

/// The `Answer:` marker splitting quotes from the final answer.
const ANSWER_MARKER: &str = "Answer:";

fn citation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Bracketed reference lists like [12, 7].
    RE.get_or_init(|| Regex::new(r"\[[\s,0-9]*\]").expect("citation marker pattern is valid"))
}

fn strip_citations(text: &str) -> String {
    citation_re().replace_all(text, "").into_owned()
}

/// A generated answer plus the evidence blocks it was grounded in.
#[derive(Debug, Clone)]
pub struct Response {
    pub question: String,
    pub answer: String,
    pub sources: String,
    pub facts: String,
}

impl Response {
    /// The final-answer segment with bracketed citation markers stripped.
    ///
    /// When the marker is absent the whole answer is treated as final.
    pub fn answer_without_references(&self) -> String {
        let answer = match self.answer.find(ANSWER_MARKER) {
            Some(index) => self.answer[index + ANSWER_MARKER.len()..].trim_start(),
            None => self.answer.as_str(),
        };
        strip_citations(answer)
    }

    /// Split into the citation preamble and the clean final answer.
    ///
    /// `quotes` keeps its citations as the citation record; `results` is
    /// the stripped deliverable.
    pub fn into_qa_answer(self) -> QaAnswer {
        match self.answer.split_once(ANSWER_MARKER) {
            Some((quotes, answer)) => QaAnswer {
                results: strip_citations(answer.trim_start()),
                quotes: quotes.to_string(),
            },
            None => QaAnswer {
                results: strip_citations(&self.answer),
                quotes: String::new(),
            },
        }
    }
}

/// Formats retrieved evidence and issues the grounded-generation call.
pub struct QaResponse {
    completion: Arc<dyn ICompletionProvider>,
    template: PromptTemplate,
}

impl QaResponse {
    pub fn new(completion: Arc<dyn ICompletionProvider>) -> Self {
        Self {
            completion,
            template: PromptTemplate::new(prompts::ANSWER_QUESTION_PROMPT),
        }
    }

    pub fn generate_response(&self, context: &QaContext) -> PrismResult<Response> {
        let chunks = join_formatted(context, &[CHUNKS], "chunk");
        let facts = join_formatted(context, &[FACT_SIMILARITY_SEARCH, EXPANDED_FACTS], "fact");

        let communities: String = context
            .select(&[COMMUNITIES], &Selector::parse("community/value"))
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");

        // Communities and chunks together form the sources block; facts
        // stay separate in the prompt.
        let sources = format!("{communities}\n\n{chunks}");

        debug!(
            sources_len = sources.len(),
            facts_len = facts.len(),
            "issuing grounded generation call"
        );

        let answer = self.completion.complete(
            &self.template,
            &[
                ("text", context.user_context().question()),
                ("sources", sources.as_str()),
                ("facts", facts.as_str()),
            ],
        )?;

        Ok(Response {
            question: context.user_context().question().to_string(),
            answer,
            sources,
            facts,
        })
    }
}

/// `"<text> [<source>]"` for every record carrying the given text field.
fn join_formatted(context: &QaContext, keys: &[&str], field: &str) -> String {
    context
        .results_for(keys)
        .into_iter()
        .filter_map(|record| {
            let text = record.pointer(&format!("/{field}/value"))?.as_str()?;
            Some(format!("{} [{}]", text, source_value(record)))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Source attribution across heterogeneous upstream property names,
/// defaulting to the internal source id.
fn source_value(record: &Value) -> String {
    let Some(properties) = record.get("source").and_then(Value::as_object) else {
        return String::new();
    };
    for key in SOURCE_KEYS {
        if let Some(value) = properties.get(key).and_then(Value::as_str) {
            return value.to_string();
        }
    }
    properties
        .get("sourceId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_attribution_falls_back_in_order() {
        let with_path = json!({"source": {"file_path": "sbom.json", "url": "u", "sourceId": "s1"}});
        assert_eq!(source_value(&with_path), "sbom.json");

        let with_url = json!({"source": {"url": "https://example.com", "sourceId": "s1"}});
        assert_eq!(source_value(&with_url), "https://example.com");

        let id_only = json!({"source": {"sourceId": "s1"}});
        assert_eq!(source_value(&id_only), "s1");
    }

    #[test]
    fn answer_splits_on_marker_and_strips_citations() {
        let response = Response {
            question: "q".into(),
            answer: "1. quote one [1]\n\nAnswer: log4j is affected [1, 2].".into(),
            sources: String::new(),
            facts: String::new(),
        };

        let qa = response.clone().into_qa_answer();
        assert_eq!(qa.results, "log4j is affected .");
        assert_eq!(qa.quotes, "1. quote one [1]\n\n");

        assert_eq!(
            response.answer_without_references(),
            "log4j is affected ."
        );
    }

    #[test]
    fn missing_marker_keeps_whole_answer() {
        let response = Response {
            question: "q".into(),
            answer: "plain text [3]".into(),
            sources: String::new(),
            facts: String::new(),
        };
        let qa = response.into_qa_answer();
        assert_eq!(qa.results, "plain text ");
        assert_eq!(qa.quotes, "");
    }
}
