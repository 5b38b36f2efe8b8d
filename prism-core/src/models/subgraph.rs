use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Display contract consumed by the UI collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<SubgraphNode>,
    pub edges: Vec<SubgraphEdge>,
}

/// A node in the `~`-prefixed wire format the display layer expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphNode {
    #[serde(rename = "~id")]
    pub id: String,
    #[serde(rename = "~labels")]
    pub labels: Vec<String>,
    #[serde(rename = "~properties")]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphEdge {
    #[serde(rename = "~start")]
    pub start: String,
    #[serde(rename = "~end")]
    pub end: String,
    #[serde(rename = "~type")]
    pub relation: String,
}
