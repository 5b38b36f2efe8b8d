//! LLM-judged response evaluation: completeness and faithfulness.

mod completeness;
mod faithfulness;

pub use completeness::{CompletenessReport, EvaluateCompleteness};
pub use faithfulness::{EvaluateFaithfulness, FaithfulnessReport};
