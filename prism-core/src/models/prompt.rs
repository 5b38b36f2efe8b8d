use serde::{Deserialize, Serialize};

/// A completion prompt with `{name}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Substitute `{name}` placeholders. Placeholders without a matching
    /// variable are left in place.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = self.template.clone();
        for (name, value) in vars {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }
}
