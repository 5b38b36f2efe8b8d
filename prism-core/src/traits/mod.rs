//! External-collaborator boundaries, injected at construction time.
//!
//! No global client singletons anywhere in the workspace: everything that
//! talks to the graph store or a model endpoint receives its collaborator
//! through one of these traits, so tests substitute fakes without touching
//! shared state.

mod completion;
mod embedding;
mod graph;
mod vector;

pub use completion::ICompletionProvider;
pub use embedding::{EmbedMode, IEmbeddingProvider};
pub use graph::IGraphClient;
pub use vector::IVectorIndex;
