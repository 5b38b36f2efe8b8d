//! Completion client with bounded retry.

use std::time::Duration;

use prism_core::config::CompletionConfig;
use prism_core::errors::{ModelError, PrismResult};
use prism_core::models::PromptTemplate;
use prism_core::traits::ICompletionProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::retry::RetryPolicy;
use crate::transport;

#[derive(Debug, Serialize)]
struct CompleteRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f64,
    #[serde(rename = "maxTokens")]
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompleteResponse {
    completion: String,
}

/// [`ICompletionProvider`] over a blocking HTTP endpoint.
pub struct HttpCompletionClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig, retry: RetryPolicy) -> PrismResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::Transport {
                provider: config.model.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry,
        })
    }

    fn call(&self, prompt: &str) -> Result<String, ModelError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&CompleteRequest {
                model: &self.model,
                prompt,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            })
            .send()
            .map_err(|e| transport::send_error(&self.model, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(transport::status_error(&self.model, status, body));
        }

        let body: CompleteResponse = response.json().map_err(|e| ModelError::MalformedOutput {
            reason: e.to_string(),
        })?;

        Ok(body.completion)
    }
}

impl ICompletionProvider for HttpCompletionClient {
    fn complete(&self, template: &PromptTemplate, vars: &[(&str, &str)]) -> PrismResult<String> {
        let prompt = template.render(vars);
        debug!(model = %self.model, prompt_len = prompt.len(), "completion call");
        let completion = self.retry.run("complete", || self.call(&prompt))?;
        Ok(completion)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
