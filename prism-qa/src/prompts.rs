//! Prompt templates for routing and translation.

/// Classify a question as database / document / both.
pub const CLASSIFY_QUESTION_PROMPT: &str = "\
You are an expert in determining whether a question needs a database query,
a document query, or both. Given the question below:

{question}

Is this best answered by a database query, a document query, or both?
Answer with exactly one of: database, document, both, or i don't know.";

/// Extract the SBOM element and id a question targets.
pub const EXTRACT_TARGET_PROMPT: &str = "\
You are an expert in Software Bill of Materials. Given the question below:

{question}

Tell me whether the user wants to know about a Document, Component, License,
Vulnerability, or Reference element, and what value they want to find out
about. The answer must be exactly two lines: the element type name on the
first line and the id on the second. Do not add any additional words.";

/// Translate a question into openCypher against the SBOM graph.
pub const NL_QUERY_PROMPT: &str = "\
You translate questions about a software bill of materials into openCypher.

Node labels in the graph: {labels}

Rules: wrap all property names in backticks, exclude label names; compare
string values in lowercase; return only the query, no commentary.

Question: {question}

If you don't know how to write the query, return exactly: I don't know";
