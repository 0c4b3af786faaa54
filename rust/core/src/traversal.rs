// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Depth-first collection of object ids from a recomposed root object.
//!
//! Walks the root's data-bearing collections (materials, views, project
//! information, sheets, elements) and descends into hosted `elements`, then
//! walks every `@`-prefixed member of the root's type definitions.

use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::base::Base;

/// Which members of the root object are walked.
#[derive(Debug, Clone)]
pub struct TraversalOptions {
    /// Root members holding objects of interest.
    pub collection_keys: Vec<String>,
    /// Root member holding type definitions, grouped under `@`-prefixed keys.
    pub types_key: String,
    /// Member under which an object nests hosted child objects.
    pub nested_key: String,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            collection_keys: ["@Materials", "@Views", "@Project Information", "@Sheets", "elements"]
                .into_iter()
                .map(String::from)
                .collect(),
            types_key: "@Types".into(),
            nested_key: "elements".into(),
        }
    }
}

/// Collect the de-duplicated ids of every object of interest under `root`.
///
/// Ids are returned in first-seen order. The root's own id is never included.
pub fn collect_object_ids(root: &Base, options: &TraversalOptions) -> Vec<String> {
    let mut collector = IdCollector {
        root_id: root.id(),
        nested_key: &options.nested_key,
        seen: FxHashSet::default(),
        ordered: Vec::new(),
    };

    for key in &options.collection_keys {
        match root.get(key) {
            Some(value) => collector.visit(value),
            None => tracing::debug!(key = %key, "Root object has no such collection"),
        }
    }

    let element_count = collector.ordered.len();

    match root.get_base(&options.types_key) {
        Some(types) => {
            for (key, value) in types.properties() {
                if key.starts_with('@') {
                    collector.visit(value);
                }
            }
        }
        None => tracing::debug!(key = %options.types_key, "Root object has no type definitions"),
    }

    tracing::info!(
        objects = element_count,
        types = collector.ordered.len() - element_count,
        "Collected object ids"
    );

    collector.ordered
}

struct IdCollector<'a> {
    root_id: Option<&'a str>,
    nested_key: &'a str,
    seen: FxHashSet<String>,
    ordered: Vec<String>,
}

impl IdCollector<'_> {
    fn visit(&mut self, value: &Value) {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.visit(item);
                }
            }
            Value::Object(map) => {
                let id = if map.get("speckle_type").and_then(Value::as_str) == Some("reference") {
                    map.get("referencedId").and_then(Value::as_str)
                } else {
                    map.get("id").and_then(Value::as_str)
                };

                if let Some(id) = id {
                    self.record(id);
                }

                if let Some(nested) = map.get(self.nested_key) {
                    self.visit(nested);
                }
            }
            _ => {}
        }
    }

    fn record(&mut self, id: &str) {
        if Some(id) == self.root_id {
            return;
        }
        if self.seen.insert(id.to_string()) {
            self.ordered.push(id.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root() -> Base {
        Base::from_value(json!({
            "id": "root",
            "speckle_type": "Base",
            "@Materials": [{"id": "m1"}, {"id": "m2"}],
            "@Views": [{"id": "v1"}],
            "@Project Information": {"id": "info", "speckle_type": "Base"},
            "elements": [
                {"id": "wall", "elements": [{"id": "window"}, {"id": "m1"}]},
                {"speckle_type": "reference", "referencedId": "door"},
                {"name": "no id"}
            ],
            "@Types": {
                "id": "types",
                "@Objects.BuiltElements.Revit.RevitWall": [{"id": "t1"}, {"id": "t2"}],
                "@Objects.Other.Material": [{"id": "t1"}],
                "notATypeList": [{"id": "ignored"}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn collects_ids_depth_first_in_first_seen_order() {
        let ids = collect_object_ids(&root(), &TraversalOptions::default());
        assert_eq!(
            ids,
            vec!["m1", "m2", "v1", "info", "wall", "window", "door", "t1", "t2"]
        );
    }

    #[test]
    fn missing_collections_are_skipped() {
        let base = Base::from_value(json!({"id": "root", "elements": [{"id": "a"}]})).unwrap();
        assert_eq!(collect_object_ids(&base, &TraversalOptions::default()), vec!["a"]);
    }

    #[test]
    fn root_id_is_never_collected() {
        let base = Base::from_value(json!({"id": "root", "elements": [{"id": "root"}, {"id": "b"}]}))
            .unwrap();
        assert_eq!(collect_object_ids(&base, &TraversalOptions::default()), vec!["b"]);
    }

    #[test]
    fn custom_collection_keys() {
        let options = TraversalOptions {
            collection_keys: vec!["@Views".into()],
            ..Default::default()
        };
        let ids = collect_object_ids(&root(), &options);
        assert_eq!(ids, vec!["v1", "t1", "t2"]);
    }
}
