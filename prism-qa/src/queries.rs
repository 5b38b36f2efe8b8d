//! Canned openCypher for the SBOM vulnerability graph.

use prism_core::errors::{GraphError, PrismResult};
use prism_core::models::{Subgraph, SubgraphEdge, SubgraphNode};
use prism_core::traits::IGraphClient;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

pub const VULNERABILITY_LIST_QUERY: &str = "\
MATCH (n:Vulnerability)
RETURN n.id AS id ORDER BY id";

pub const NODE_LABELS_QUERY: &str = "\
MATCH (n)
RETURN DISTINCT labels(n) AS labels";

const SUBGRAPH_NODES_QUERY: &str = "\
MATCH (n:Vulnerability {id: $id})
CALL graph.vectors.topKByNode(n)
YIELD node, score
WITH n, node ORDER BY score ASC
MATCH p = (n)-[:AFFECTS]-(c:Component)-[:AFFECTS]-(other:Vulnerability)
WITH nodes(p) AS nodes
UNWIND nodes AS n
RETURN collect(DISTINCT n) AS nodes";

const SUBGRAPH_EDGES_QUERY: &str = "\
MATCH (n:Vulnerability {id: $id})
CALL graph.vectors.topKByNode(n)
YIELD node, score
WITH n, node ORDER BY score ASC
MATCH p = (n)-[:AFFECTS]-(c:Component)-[:AFFECTS]-(other:Vulnerability)
WITH relationships(p) AS edges
UNWIND edges AS e
RETURN collect(DISTINCT e) AS edges";

/// Top-K vulnerabilities nearest the seed by node embedding, ascending by
/// distance, seed excluded.
fn similarity_query(top_k: usize) -> String {
    format!(
        "MATCH (n:Vulnerability {{id: $id}})\n\
         CALL graph.vectors.topKByNode(n)\n\
         YIELD node, score\n\
         WITH n, node, score WHERE node <> n\n\
         RETURN node.id AS id, node.description AS description, score\n\
         ORDER BY score ASC LIMIT {top_k}"
    )
}

/// All vulnerability ids, sorted.
pub fn vulnerability_ids(graph: &dyn IGraphClient) -> PrismResult<Vec<String>> {
    let rows = graph.execute(VULNERABILITY_LIST_QUERY, Map::new())?;
    Ok(rows
        .iter()
        .filter_map(|row| row.get("id").and_then(Value::as_str))
        .map(String::from)
        .collect())
}

/// Distinct node labels present in the graph.
pub fn node_labels(graph: &dyn IGraphClient) -> PrismResult<Vec<String>> {
    let rows = graph.execute(NODE_LABELS_QUERY, Map::new())?;
    let mut labels: Vec<String> = Vec::new();
    for row in rows {
        let Some(row_labels) = row.get("labels").and_then(Value::as_array) else {
            continue;
        };
        for label in row_labels.iter().filter_map(Value::as_str) {
            if !labels.iter().any(|known| known == label) {
                labels.push(label.to_string());
            }
        }
    }
    Ok(labels)
}

/// Ranked similar vulnerabilities for a seed id.
pub fn similar_vulnerabilities(
    graph: &dyn IGraphClient,
    id: &str,
    top_k: usize,
) -> PrismResult<Vec<Value>> {
    let mut params = Map::new();
    params.insert("id".to_string(), json!(id));
    graph.execute(&similarity_query(top_k), params)
}

/// Similarity neighborhood of a vulnerability, assembled into the display
/// wire format.
pub fn vulnerability_subgraph(graph: &dyn IGraphClient, id: &str) -> PrismResult<Subgraph> {
    let mut params = Map::new();
    params.insert("id".to_string(), json!(id));

    let node_rows = graph.execute(SUBGRAPH_NODES_QUERY, params.clone())?;
    let edge_rows = graph.execute(SUBGRAPH_EDGES_QUERY, params)?;

    Ok(Subgraph {
        nodes: collect_aliased::<SubgraphNode>(&node_rows, "nodes")?,
        edges: collect_aliased::<SubgraphEdge>(&edge_rows, "edges")?,
    })
}

/// Deserialize the collected array the first row holds under `alias`.
fn collect_aliased<T: DeserializeOwned>(rows: &[Value], alias: &str) -> PrismResult<Vec<T>> {
    let Some(items) = rows
        .first()
        .and_then(|row| row.get(alias))
        .and_then(Value::as_array)
    else {
        return Ok(Vec::new());
    };

    items
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone()).map_err(|e| {
                GraphError::MalformedResponse {
                    reason: e.to_string(),
                }
                .into()
            })
        })
        .collect()
}
