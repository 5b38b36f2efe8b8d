//! Shared data models.

mod prompt;
mod response;
mod subgraph;

pub use prompt::PromptTemplate;
pub use response::{QaAnswer, QueryOutcome};
pub use subgraph::{Subgraph, SubgraphEdge, SubgraphNode};
