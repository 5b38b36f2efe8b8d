/// Model-endpoint errors, shared by the embedding and completion providers.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("provider {provider} throttled the request")]
    Throttled { provider: String },

    #[error("provider {provider} timed out")]
    Timeout { provider: String },

    #[error("transport error reaching {provider}: {reason}")]
    Transport { provider: String, reason: String },

    #[error("http {status} from {provider}: {reason}")]
    Http {
        provider: String,
        status: u16,
        reason: String,
    },

    #[error("malformed model output: {reason}")]
    MalformedOutput { reason: String },

    #[error("retries exhausted after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },
}

impl ModelError {
    /// Whether a retry with identical inputs can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::Throttled { .. }
            | ModelError::Timeout { .. }
            | ModelError::Transport { .. } => true,
            ModelError::Http { status, .. } => *status >= 500,
            ModelError::MalformedOutput { .. } | ModelError::RetriesExhausted { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_and_timeouts_are_transient() {
        let throttled = ModelError::Throttled {
            provider: "m".into(),
        };
        let timeout = ModelError::Timeout {
            provider: "m".into(),
        };
        assert!(throttled.is_transient());
        assert!(timeout.is_transient());
    }

    #[test]
    fn server_errors_are_transient_client_errors_are_not() {
        let server = ModelError::Http {
            provider: "m".into(),
            status: 503,
            reason: "unavailable".into(),
        };
        let client = ModelError::Http {
            provider: "m".into(),
            status: 400,
            reason: "bad request".into(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
    }

    #[test]
    fn malformed_output_is_terminal() {
        let err = ModelError::MalformedOutput {
            reason: "missing field".into(),
        };
        assert!(!err.is_transient());
    }
}
