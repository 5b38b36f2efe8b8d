use crate::errors::PrismResult;
use crate::models::PromptTemplate;

/// Completion inference provider.
pub trait ICompletionProvider: Send + Sync {
    /// Render the template with `vars` and return the completion text.
    fn complete(&self, template: &PromptTemplate, vars: &[(&str, &str)]) -> PrismResult<String>;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}
