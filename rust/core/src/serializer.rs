// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object transport decoding, recomposition and flattening.
//!
//! The object transport delivers a root object and its closure as one line
//! per object (`<id>\t<json>`). Detached children appear in their parents as
//! reference stubs and long lists are split into data chunks. [`recompose`]
//! rebuilds the full object graph from such a table and [`flatten`] goes the
//! other way, turning one object back into its own property dictionary.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::base::{Base, DATA_CHUNK_TYPE, REFERENCE_TYPE};
use crate::error::{Error, Result};

/// Internal member listing an object's descendants.
const CLOSURE_KEY: &str = "__closure";

/// Objects received from the transport, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    root_id: Option<String>,
    objects: FxHashMap<String, Value>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object. The first inserted id becomes the root.
    pub fn insert(&mut self, id: impl Into<String>, object: Value) {
        let id = id.into();
        if self.root_id.is_none() {
            self.root_id = Some(id.clone());
        }
        self.objects.insert(id, object);
    }

    /// Id of the first object in the stream.
    pub fn root_id(&self) -> Option<&str> {
        self.root_id.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.objects.get(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Parse a transport body of `<id>\t<json>` lines.
pub fn parse_object_stream(text: &str) -> Result<ObjectTable> {
    let mut table = ObjectTable::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let (id, json) = line.split_once('\t').ok_or_else(|| Error::MalformedStream {
            line: index + 1,
            reason: "missing tab separator".into(),
        })?;

        if id.is_empty() {
            return Err(Error::MalformedStream {
                line: index + 1,
                reason: "empty object id".into(),
            });
        }

        let object: Value = serde_json::from_str(json).map_err(|e| Error::MalformedStream {
            line: index + 1,
            reason: e.to_string(),
        })?;

        table.insert(id, object);
    }

    if table.is_empty() {
        return Err(Error::EmptyStream);
    }

    tracing::debug!(objects = table.len(), root = ?table.root_id(), "Parsed object stream");
    Ok(table)
}

/// Rebuild the object `root_id` with every reference and chunk resolved.
pub fn recompose(root_id: &str, table: &ObjectTable) -> Result<Base> {
    let root = table
        .get(root_id)
        .ok_or_else(|| Error::MissingReference(root_id.to_string()))?;

    let mut stack = vec![root_id.to_string()];
    let value = resolve(root, table, &mut stack)?;
    Base::from_value(value)
}

fn resolve(value: &Value, table: &ObjectTable, stack: &mut Vec<String>) -> Result<Value> {
    match value {
        Value::Object(map) => {
            if map.get("speckle_type").and_then(Value::as_str) == Some(REFERENCE_TYPE) {
                if let Some(id) = map.get("referencedId").and_then(Value::as_str) {
                    return resolve_reference(id, table, stack);
                }
            }

            let mut resolved = Map::with_capacity(map.len());
            for (key, child) in map {
                if key == CLOSURE_KEY {
                    continue;
                }
                resolved.insert(strip_chunk_marker(key), resolve(child, table, stack)?);
            }
            Ok(Value::Object(resolved))
        }
        Value::Array(items) => {
            let resolved = items
                .iter()
                .map(|item| resolve(item, table, stack))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(merge_chunks(resolved)))
        }
        other => Ok(other.clone()),
    }
}

fn resolve_reference(id: &str, table: &ObjectTable, stack: &mut Vec<String>) -> Result<Value> {
    if stack.iter().any(|seen| seen == id) {
        return Err(Error::CyclicReference(id.to_string()));
    }

    let target = table
        .get(id)
        .ok_or_else(|| Error::MissingReference(id.to_string()))?;

    stack.push(id.to_string());
    let resolved = resolve(target, table, stack);
    stack.pop();
    resolved
}

/// Concatenate the `data` of a list made entirely of data chunks.
fn merge_chunks(items: Vec<Value>) -> Vec<Value> {
    let all_chunks = !items.is_empty()
        && items.iter().all(|item| {
            item.get("speckle_type").and_then(Value::as_str) == Some(DATA_CHUNK_TYPE)
        });

    if !all_chunks {
        return items;
    }

    items
        .into_iter()
        .flat_map(|chunk| match chunk {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(data)) => data,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        })
        .collect()
}

/// `@(31250)vertices` becomes `@vertices`.
fn strip_chunk_marker(key: &str) -> String {
    if let Some(rest) = key.strip_prefix("@(") {
        if let Some(close) = rest.find(')') {
            let size = &rest[..close];
            if !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()) {
                return format!("@{}", &rest[close + 1..]);
            }
        }
    }
    key.to_string()
}

/// Whether a member is stored detached from its parent.
pub fn is_detachable(key: &str) -> bool {
    key.starts_with('@') || key == "elements"
}

/// The object's own property dictionary.
///
/// Detachable members holding identified objects are replaced by reference
/// stubs, inline members are kept as they are and the closure is dropped.
pub fn flatten(base: &Base) -> Map<String, Value> {
    base.as_map()
        .iter()
        .filter(|(key, _)| key.as_str() != CLOSURE_KEY)
        .map(|(key, value)| {
            let value = if is_detachable(key) {
                detach(value)
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect()
}

fn detach(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(detach).collect()),
        Value::Object(map) => match map.get("id").and_then(Value::as_str) {
            Some(id) if map.get("speckle_type").and_then(Value::as_str) != Some(REFERENCE_TYPE) => {
                reference_stub(id)
            }
            _ => value.clone(),
        },
        other => other.clone(),
    }
}

fn reference_stub(id: &str) -> Value {
    let mut stub = Map::new();
    stub.insert("speckle_type".into(), Value::String(REFERENCE_TYPE.into()));
    stub.insert("referencedId".into(), Value::String(id.into()));
    Value::Object(stub)
}
