// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dynamically typed Speckle base objects.
//!
//! A base object is a JSON map with a handful of declared members that every
//! object carries and an open set of dynamic members added by connectors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{json_type_name, Error, Result};

/// Members every base object declares.
pub const DECLARED_MEMBERS: [&str; 5] =
    ["id", "speckle_type", "applicationId", "totalChildrenCount", "units"];

/// Speckle type of a detached-object reference.
pub const REFERENCE_TYPE: &str = "reference";

/// Speckle type of a list chunk.
pub const DATA_CHUNK_TYPE: &str = "Speckle.Core.Models.DataChunk";

/// A dynamically typed graph-model object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Base {
    members: Map<String, Value>,
}

impl Base {
    /// Wrap a JSON map.
    pub fn new(members: Map<String, Value>) -> Self {
        Self { members }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(members) => Ok(Self { members }),
            other => Err(Error::NotAnObject(json_type_name(&other))),
        }
    }

    /// Object id (content hash), if present.
    pub fn id(&self) -> Option<&str> {
        self.members.get("id").and_then(Value::as_str)
    }

    /// Speckle type, if present.
    pub fn speckle_type(&self) -> Option<&str> {
        self.members.get("speckle_type").and_then(Value::as_str)
    }

    /// Raw member access by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.members.get(key)
    }

    /// Member access for a nested object.
    pub fn get_base(&self, key: &str) -> Option<Base> {
        match self.members.get(key) {
            Some(Value::Object(map)) => Some(Base::new(map.clone())),
            _ => None,
        }
    }

    /// Declared members present on this object, in declaration order.
    pub fn member_names(&self) -> Vec<&str> {
        DECLARED_MEMBERS
            .iter()
            .copied()
            .filter(|name| self.members.contains_key(*name))
            .collect()
    }

    /// Dynamic members: everything not declared and not internal (`__` prefix).
    pub fn dynamic_member_names(&self) -> Vec<&str> {
        self.members
            .keys()
            .map(String::as_str)
            .filter(|key| !DECLARED_MEMBERS.contains(key) && !key.starts_with("__"))
            .collect()
    }

    /// Dynamic then declared members with their values.
    pub fn properties(&self) -> Vec<(&str, &Value)> {
        self.dynamic_member_names()
            .into_iter()
            .chain(self.member_names())
            .filter_map(|key| self.members.get(key).map(|value| (key, value)))
            .collect()
    }

    /// Whether this object is a reference to a detached child.
    pub fn is_reference(&self) -> bool {
        self.speckle_type() == Some(REFERENCE_TYPE)
    }

    /// Id of the referenced object when this is a reference.
    pub fn referenced_id(&self) -> Option<&str> {
        if !self.is_reference() {
            return None;
        }
        self.members.get("referencedId").and_then(Value::as_str)
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.members
    }

    /// Take the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.members
    }
}

impl From<Base> for Value {
    fn from(base: Base) -> Self {
        Value::Object(base.members)
    }
}
