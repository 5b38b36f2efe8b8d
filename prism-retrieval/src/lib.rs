//! # prism-retrieval
//!
//! The GraphRAG pipeline: a shared append-only query context threaded
//! through an ordered chain of retrieval strategies, then reranking and
//! cited answer synthesis.

pub mod context;
pub mod eval;
pub mod pipeline;
pub mod prompts;
pub mod response;
pub mod selector;
pub mod strategies;
pub mod strategy;

pub use context::{QaContext, ResultEntry, UserContext};
pub use pipeline::Pipeline;
pub use response::{QaResponse, Response};
pub use selector::Selector;
pub use strategy::Strategy;
