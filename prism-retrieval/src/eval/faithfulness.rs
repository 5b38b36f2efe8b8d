//! Is every answer statement supported by the search results?

use std::sync::Arc;
use std::sync::OnceLock;

use prism_core::errors::{ModelError, PrismResult};
use prism_core::models::PromptTemplate;
use prism_core::traits::ICompletionProvider;
use regex::Regex;

use crate::prompts;
use crate::response::Response;

/// Per-statement support accounting from the faithfulness judge.
#[derive(Debug, Clone)]
pub struct FaithfulnessReport {
    /// `(fully + partially/2) / count`, rounded to two places.
    pub score: f64,
    pub fully_supported: usize,
    pub partially_supported: usize,
    pub unsupported: usize,
    pub evaluations: Vec<String>,
}

/// Evaluate whether an answer is faithful to its search results.
pub struct EvaluateFaithfulness {
    completion: Arc<dyn ICompletionProvider>,
    template: PromptTemplate,
}

fn evaluation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new("<evaluation>(.*?)</evaluation>").expect("evaluation tag pattern is valid")
    })
}

impl EvaluateFaithfulness {
    pub fn new(completion: Arc<dyn ICompletionProvider>) -> Self {
        Self {
            completion,
            template: PromptTemplate::new(prompts::EVALUATE_FAITHFULNESS_PROMPT),
        }
    }

    pub fn evaluate(&self, response: &Response) -> PrismResult<FaithfulnessReport> {
        let answer = response.answer_without_references();
        let search_results = format!("{}\n\n{}", response.sources, response.facts);

        let evaluation = self.completion.complete(
            &self.template,
            &[
                ("question", response.question.as_str()),
                ("answer", answer.as_str()),
                ("searchResults", search_results.as_str()),
            ],
        )?;

        let evaluations: Vec<String> = evaluation_re()
            .captures_iter(&evaluation)
            .map(|captures| captures[1].to_string())
            .collect();

        // Zero recognizable markers would divide by zero below; the
        // completion is malformed, not a zero score.
        if evaluations.is_empty() {
            return Err(ModelError::MalformedOutput {
                reason: "faithfulness evaluation contains no evaluation tags".to_string(),
            }
            .into());
        }

        let mut fully_supported = 0;
        let mut partially_supported = 0;
        let mut unsupported = 0;

        for verdict in &evaluations {
            let lower = verdict.to_lowercase();
            if lower.starts_with("fully") {
                fully_supported += 1;
            }
            if lower.starts_with("partially") {
                partially_supported += 1;
            }
            if lower.starts_with("unsupported") {
                unsupported += 1;
            }
        }

        let count = evaluations.len() as f64;
        let score = (fully_supported as f64 + partially_supported as f64 / 2.0) / count;
        let score = (score * 100.0).round() / 100.0;

        Ok(FaithfulnessReport {
            score,
            fully_supported,
            partially_supported,
            unsupported,
            evaluations,
        })
    }
}
