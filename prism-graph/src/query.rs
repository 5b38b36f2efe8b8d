//! openCypher building blocks shared by the retrieval strategies.
//!
//! Node ids are blake3 digests of the case/space-normalized name, matching
//! the ingestion convention, so a keyword rewrites into an id prefix without
//! a graph round trip.

/// Stable id fragment for a node name.
pub fn node_id(name: &str) -> String {
    blake3::hash(normalize(name).as_bytes()).to_hex().to_string()
}

/// Stable id for a name qualified by a label.
pub fn node_id_labelled(name: &str, label: &str) -> String {
    let key = format!("{}::{}", normalize(name), normalize(label));
    blake3::hash(key.as_bytes()).to_hex().to_string()
}

fn normalize(s: &str) -> String {
    s.to_lowercase().replace(' ', "_")
}

/// Map-projection snippet returning every property of `alias`.
pub fn node_result(alias: &str) -> String {
    format!("{alias}: {alias}{{.*}}")
}

/// Map-projection snippet returning only the named properties of `alias`.
pub fn node_result_with(alias: &str, properties: &[&str]) -> String {
    let props = properties
        .iter()
        .map(|p| format!(".{p}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{alias}: {alias}{{{props}}}")
}
