//! # prism-qa
//!
//! The query-routing service layer: question-type classification, canned
//! SBOM similarity/subgraph queries, NL-to-openCypher translation, and the
//! top-level dispatcher.

pub mod classifier;
pub mod nlq;
pub mod prompts;
pub mod queries;
pub mod service;

pub use classifier::{QueryTarget, QueryType, QuestionClassifier};
pub use nlq::NlQueryTranslator;
pub use service::QaService;
