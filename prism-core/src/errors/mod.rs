//! Error types, one enum per subsystem, wrapped by [`PrismError`].
//!
//! Empty retrieval results are not errors; they propagate as empty
//! collections through the pipeline, so there is no retrieval enum here.

mod config_error;
mod graph_error;
mod model_error;

pub use config_error::ConfigError;
pub use graph_error::GraphError;
pub use model_error::ModelError;

/// Top-level error for the prism workspace.
#[derive(Debug, thiserror::Error)]
pub enum PrismError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type PrismResult<T> = Result<T, PrismError>;
