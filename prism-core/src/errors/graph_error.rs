/// Graph-store query execution errors.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("graph query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("graph endpoint unreachable: {reason}")]
    Endpoint { reason: String },

    #[error("malformed graph response: {reason}")]
    MalformedResponse { reason: String },
}
