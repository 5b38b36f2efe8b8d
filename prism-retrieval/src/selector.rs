//! Selector paths resolve heterogeneous record shapes uniformly.
//!
//! A path is `/`-delimited; each segment lists `|`-delimited alternative
//! field names tried in order. The first *present* key wins at each depth.
//! Presence, not truthiness: an explicit null is still a match.

use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Selector {
    segments: Vec<Vec<String>>,
}

impl Selector {
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('/')
            .map(|segment| segment.split('|').map(str::to_string).collect())
            .collect();
        Self { segments }
    }

    /// Resolve against one record.
    ///
    /// `None` when any depth has no present alternative, including when an
    /// intermediate value is not an object.
    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let mut current = record;
        for alternatives in &self.segments {
            let object = current.as_object()?;
            current = alternatives
                .iter()
                .find_map(|alt| object.get(alt.as_str()))?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alternatives_resolve_either_producer_shape() {
        let selector = Selector::parse("fact|entity/factId|entityId");

        let fact = json!({"fact": {"factId": "f1"}});
        assert_eq!(selector.resolve(&fact), Some(&json!("f1")));

        let entity = json!({"entity": {"entityId": "e1"}});
        assert_eq!(selector.resolve(&entity), Some(&json!("e1")));

        let neither = json!({"chunk": {"chunkId": "c1"}});
        assert_eq!(selector.resolve(&neither), None);
    }

    #[test]
    fn first_present_alternative_wins() {
        let selector = Selector::parse("fact|entity/factId|entityId");
        let both = json!({"fact": {"factId": "f1"}, "entity": {"entityId": "e1"}});
        assert_eq!(selector.resolve(&both), Some(&json!("f1")));
    }

    #[test]
    fn presence_beats_truthiness() {
        let selector = Selector::parse("fact/factId");
        let null_id = json!({"fact": {"factId": null}});
        assert_eq!(selector.resolve(&null_id), Some(&Value::Null));
    }

    #[test]
    fn non_object_intermediate_is_absent() {
        let selector = Selector::parse("fact/factId");
        let scalar = json!({"fact": "not-an-object"});
        assert_eq!(selector.resolve(&scalar), None);
    }

    #[test]
    fn single_segment_selects_top_level() {
        let selector = Selector::parse("community");
        let record = json!({"community": {"value": "summary"}});
        assert_eq!(selector.resolve(&record), Some(&json!({"value": "summary"})));
    }
}
