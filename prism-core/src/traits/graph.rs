use serde_json::{Map, Value};

use crate::errors::PrismResult;

/// Query-execution boundary to the graph store.
pub trait IGraphClient: Send + Sync {
    /// Execute an openCypher query with named parameters.
    ///
    /// Each returned record maps a query-defined alias to a nested value.
    fn execute(&self, query: &str, parameters: Map<String, Value>) -> PrismResult<Vec<Value>>;
}
