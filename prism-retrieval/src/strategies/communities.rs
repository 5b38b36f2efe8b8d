//! Community membership lookup for upstream facts and entities.

use std::collections::HashSet;
use std::sync::Arc;

use prism_core::errors::PrismResult;
use prism_core::traits::IGraphClient;
use prism_graph::query::node_result;
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::QaContext;
use crate::selector::Selector;
use crate::strategies::facts::FACT_SIMILARITY_SEARCH;
use crate::strategies::keywords::KEYWORD_SEARCH;
use crate::strategy::Strategy;

/// Result-entry key for [`GetCommunities`].
pub const COMMUNITIES: &str = "communities";

/// Fetch the communities the upstream facts and entities belong to.
///
/// Facts are members directly; entities indirectly through the facts they
/// own, hence the two-branch union.
pub struct GetCommunities {
    graph: Arc<dyn IGraphClient>,
    sources: Vec<&'static str>,
    top_n: usize,
}

impl GetCommunities {
    pub fn new(graph: Arc<dyn IGraphClient>, top_n: usize) -> Self {
        Self::with_sources(graph, vec![FACT_SIMILARITY_SEARCH, KEYWORD_SEARCH], top_n)
    }

    pub fn with_sources(
        graph: Arc<dyn IGraphClient>,
        sources: Vec<&'static str>,
        top_n: usize,
    ) -> Self {
        Self {
            graph,
            sources,
            top_n,
        }
    }

    fn query(&self) -> String {
        format!(
            "MATCH (fact:Fact)-[:MEMBER_OF]->(community) WHERE fact.factId IN $ids\n\
             WITH DISTINCT community\n\
             RETURN {{\n    {community}\n}} AS result LIMIT {top_n}\n\
             UNION\n\
             MATCH (entity:Entity)-->(:Fact)-[:MEMBER_OF]->(community) \
             WHERE entity.entityId IN $ids\n\
             WITH DISTINCT community\n\
             RETURN {{\n    {community}\n}} AS result LIMIT {top_n}",
            community = node_result("community"),
            top_n = self.top_n,
        )
    }
}

impl Strategy for GetCommunities {
    fn name(&self) -> &'static str {
        COMMUNITIES
    }

    fn accept(&self, mut context: QaContext) -> PrismResult<QaContext> {
        let selector = Selector::parse("fact|entity/factId|entityId");
        let ids: Vec<Value> = context
            .select(&self.sources, &selector)
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        let mut params = Map::new();
        params.insert("ids".to_string(), Value::Array(ids));

        let rows = self.graph.execute(&self.query(), params)?;

        // Dedup by community id, first occurrence wins, then truncate.
        let mut seen: HashSet<String> = HashSet::new();
        let mut communities: Vec<Value> = Vec::new();
        for row in rows {
            let Some(community) = row.get("result") else {
                continue;
            };
            let Some(community_id) = community
                .pointer("/community/communityId")
                .and_then(Value::as_str)
            else {
                continue;
            };
            if seen.insert(community_id.to_string()) {
                communities.push(community.clone());
            }
        }
        communities.truncate(self.top_n);

        debug!(communities = communities.len(), "community lookup complete");
        context.append(COMMUNITIES, communities);
        Ok(context)
    }
}
