use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Subgraph;

/// Final answer returned to the caller.
///
/// `results` is the clean deliverable with citation markers stripped;
/// `quotes` retains the preamble/citation segment as the citation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaAnswer {
    pub results: String,
    pub quotes: String,
}

/// What a dispatched query hands the display collaborator.
#[derive(Debug, Clone, Serialize)]
pub enum QueryOutcome {
    /// A synthesized, cited natural-language answer.
    Answer(QaAnswer),
    /// Tabular query results.
    Rows(Vec<Value>),
    /// A subgraph in the display wire format.
    Subgraph(Subgraph),
    /// The question shape is not supported; the message is user-visible.
    Unsupported(String),
}
