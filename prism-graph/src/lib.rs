//! # prism-graph
//!
//! Graph-store access: openCypher-over-HTTP query execution, the stable
//! node-id hashing convention, query projection helpers, and the external
//! vector-index client.

pub mod client;
pub mod query;
pub mod vector;

pub use client::HttpGraphClient;
pub use vector::HttpVectorIndex;
