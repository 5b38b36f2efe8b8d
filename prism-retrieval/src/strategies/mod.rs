//! The closed set of retrieval strategies.

pub mod chunks;
pub mod communities;
pub mod facts;
pub mod keywords;

pub use chunks::{ChunkSimilaritySearch, GetChunks, RerankChunks};
pub use communities::GetCommunities;
pub use facts::{FactExpansion, GraphFactSimilaritySearch, IndexFactSimilaritySearch};
pub use keywords::{ExtractKeywords, KeywordSearch};
