//! Does the answer cover everything the search results support?

use std::sync::Arc;

use prism_core::errors::{ModelError, PrismResult};
use prism_core::models::PromptTemplate;
use prism_core::traits::ICompletionProvider;
use regex::Regex;

use crate::prompts;
use crate::response::Response;

/// Verdict plus statement accounting from the completeness judge.
#[derive(Debug, Clone)]
pub struct CompletenessReport {
    /// The raw `yes`/`no` verdict.
    pub result: String,
    pub reason: String,
    /// `statements / (statements + additional)`; 0.0 on a `no` verdict.
    pub score: f64,
    pub num_statements: usize,
    pub num_additional_statements: usize,
    pub statements: String,
    pub additional_statements: String,
    pub improved_answer: String,
}

/// Evaluate whether an answer fully addresses its question.
pub struct EvaluateCompleteness {
    completion: Arc<dyn ICompletionProvider>,
    template: PromptTemplate,
}

impl EvaluateCompleteness {
    pub fn new(completion: Arc<dyn ICompletionProvider>) -> Self {
        Self {
            completion,
            template: PromptTemplate::new(prompts::EVALUATE_COMPLETENESS_PROMPT),
        }
    }

    pub fn evaluate(&self, response: &Response) -> PrismResult<CompletenessReport> {
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

        let Some(result) = tag(&evaluation, "answerSatisfiesQuestion") else {
            return Err(ModelError::MalformedOutput {
                reason: "completeness evaluation missing verdict tag".to_string(),
            }
            .into());
        };
        let result = result.trim().to_lowercase();

        let reason = tag(&evaluation, "reason").unwrap_or_default();
        let statements = tag(&evaluation, "statements").unwrap_or_default();
        let additional_statements = tag(&evaluation, "additionalStatements").unwrap_or_default();
        let improved_answer = tag(&evaluation, "improvedAnswer").unwrap_or_default();

        if result == "no" {
            return Ok(CompletenessReport {
                result,
                reason,
                score: 0.0,
                num_statements: 0,
                num_additional_statements: 0,
                statements: String::new(),
                additional_statements: String::new(),
                improved_answer: String::new(),
            });
        }

        let num_statements = line_count(&statements);
        let num_additional_statements = line_count(&additional_statements);
        let total = num_statements + num_additional_statements;
        let score = if total == 0 {
            0.0
        } else {
            num_statements as f64 / total as f64
        };

        Ok(CompletenessReport {
            result,
            reason,
            score,
            num_statements,
            num_additional_statements,
            statements,
            additional_statements,
            improved_answer,
        })
    }
}

/// Content of the first `<name>...</name>` tag, spanning lines.
fn tag(evaluation: &str, name: &str) -> Option<String> {
    let pattern = format!("(?s)<{name}>(.*?)</{name}>");
    let re = Regex::new(&pattern).ok()?;
    re.captures(evaluation)
        .map(|captures| captures[1].to_string())
}

fn line_count(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::errors::PrismError;

    struct CannedCompletion(String);

    impl ICompletionProvider for CannedCompletion {
        fn complete(&self, _: &PromptTemplate, _: &[(&str, &str)]) -> PrismResult<String> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn response() -> Response {
        Response {
            question: "q".into(),
            answer: "Answer: a".into(),
            sources: "s".into(),
            facts: "f".into(),
        }
    }

    fn evaluate(completion_text: &str) -> PrismResult<CompletenessReport> {
        let judge = EvaluateCompleteness::new(Arc::new(CannedCompletion(completion_text.into())));
        judge.evaluate(&response())
    }

    #[test]
    fn yes_verdict_scores_statement_coverage() {
        let report = evaluate(
            "<answerSatisfiesQuestion>yes</answerSatisfiesQuestion>\
             <reason>covers it</reason>\
             <statements>one\ntwo\nthree</statements>\
             <additionalStatements>four</additionalStatements>\
             <improvedAnswer>better</improvedAnswer>",
        )
        .unwrap();

        assert_eq!(report.result, "yes");
        assert_eq!(report.num_statements, 3);
        assert_eq!(report.num_additional_statements, 1);
        assert_eq!(report.score, 0.75);
        assert_eq!(report.improved_answer, "better");
    }

    #[test]
    fn no_verdict_zeroes_everything() {
        let report = evaluate(
            "<answerSatisfiesQuestion>no</answerSatisfiesQuestion>\
             <reason>off topic</reason>\
             <statements>one</statements>\
             <additionalStatements>two</additionalStatements>",
        )
        .unwrap();

        assert_eq!(report.result, "no");
        assert_eq!(report.score, 0.0);
        assert_eq!(report.num_statements, 0);
        assert!(report.statements.is_empty());
    }

    #[test]
    fn missing_verdict_is_malformed_output() {
        let err = evaluate("no tags at all").unwrap_err();
        assert!(matches!(
            err,
            PrismError::Model(ModelError::MalformedOutput { .. })
        ));
    }
}
