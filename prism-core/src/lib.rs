//! # prism-core
//!
//! Foundation crate for the prism GraphRAG engine.
//! Defines the types, traits, errors, and config shared by every other
//! crate in the workspace.

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::PrismConfig;
pub use errors::{PrismError, PrismResult};
pub use models::{PromptTemplate, QaAnswer, QueryOutcome, Subgraph};
pub use traits::{EmbedMode, ICompletionProvider, IEmbeddingProvider, IGraphClient, IVectorIndex};
