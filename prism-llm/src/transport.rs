//! Shared HTTP-to-ModelError classification for the model clients.

use prism_core::errors::ModelError;

/// Classify a reqwest send failure.
pub(crate) fn send_error(provider: &str, err: reqwest::Error) -> ModelError {
    if err.is_timeout() {
        ModelError::Timeout {
            provider: provider.to_string(),
        }
    } else {
        ModelError::Transport {
            provider: provider.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Classify a non-success HTTP status. 429 is throttling; everything else
/// keeps its status so `is_transient` can split 5xx from 4xx.
pub(crate) fn status_error(
    provider: &str,
    status: reqwest::StatusCode,
    body: String,
) -> ModelError {
    if status.as_u16() == 429 {
        ModelError::Throttled {
            provider: provider.to_string(),
        }
    } else {
        ModelError::Http {
            provider: provider.to_string(),
            status: status.as_u16(),
            reason: body,
        }
    }
}
