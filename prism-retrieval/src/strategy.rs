//! The polymorphic contract every retrieval/ranking stage implements.

use prism_core::errors::PrismResult;

use crate::context::QaContext;

/// A single named stage in the pipeline.
///
/// `accept` reads prior result sets by name from the shared context and
/// appends exactly one new result set under its own name. Strategies are
/// stateless across invocations; everything they need (clients, limits,
/// upstream strategy names) is captured at construction.
pub trait Strategy: Send + Sync {
    /// Stable name used as the result-entry key. This is the addressing
    /// mechanism for cross-strategy data dependencies.
    fn name(&self) -> &'static str;

    /// Transform the context, appending this strategy's result set.
    fn accept(&self, context: QaContext) -> PrismResult<QaContext>;
}
