// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object records: one row per fetched object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::base::Base;
use crate::error::{Error, Result};
use crate::serializer::flatten;

pub const MODEL_URL_COLUMN: &str = "Model URL";
pub const VERSION_OBJECT_ID_COLUMN: &str = "Version Object ID";
pub const OBJECT_ID_COLUMN: &str = "Object ID";
pub const SPECKLE_TYPE_COLUMN: &str = "speckle_type";

/// A fetched object with the columns identifying where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Project URL on the server.
    pub model_url: String,
    /// Root object id of the version the object belongs to.
    pub version_id: String,
    /// Id of the object itself.
    pub object_id: String,
    /// Flattened property dictionary.
    pub data: Map<String, Value>,
}

impl ObjectRecord {
    pub fn new(
        model_url: impl Into<String>,
        version_id: impl Into<String>,
        object_id: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            model_url: model_url.into(),
            version_id: version_id.into(),
            object_id: object_id.into(),
            data,
        }
    }

    /// Speckle type recorded in the object's data.
    pub fn speckle_type(&self) -> Option<&str> {
        self.data.get("speckle_type").and_then(Value::as_str)
    }

    /// The object's `parameters` member, when it is an object.
    pub fn parameters(&self) -> Option<&Map<String, Value>> {
        self.data.get("parameters").and_then(Value::as_object)
    }
}

/// Build records from objects received through the object transport.
pub fn records_from_objects<'a, I>(model_url: &str, version_id: &str, objects: I) -> Vec<ObjectRecord>
where
    I: IntoIterator<Item = (String, &'a Base)>,
{
    objects
        .into_iter()
        .map(|(object_id, base)| ObjectRecord::new(model_url, version_id, object_id, flatten(base)))
        .collect()
}

/// A child row returned by the object children query.
#[derive(Debug, Clone, Deserialize)]
pub struct ChildObject {
    pub id: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Build records from object children returned by the GraphQL API.
pub fn records_from_children(
    model_url: &str,
    version_id: &str,
    children: Vec<ChildObject>,
) -> Result<Vec<ObjectRecord>> {
    children
        .into_iter()
        .map(|child| {
            let data = match child.data {
                Some(Value::Object(map)) => map,
                _ => return Err(Error::MissingChildData(child.id)),
            };
            Ok(ObjectRecord::new(model_url, version_id, child.id, data))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_from_objects_flatten_data() {
        let base = Base::from_value(json!({
            "id": "wall",
            "speckle_type": "Objects.BuiltElements.Wall",
            "__closure": {"mesh": 1},
            "parameters": {"HEIGHT": {"name": "Height", "value": 3}}
        }))
        .unwrap();

        let records = records_from_objects("https://srv/projects/p", "root", [("wall".to_string(), &base)]);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.object_id, "wall");
        assert_eq!(record.version_id, "root");
        assert_eq!(record.speckle_type(), Some("Objects.BuiltElements.Wall"));
        assert!(record.parameters().is_some());
        assert!(!record.data.contains_key("__closure"));
    }

    #[test]
    fn children_without_data_are_rejected() {
        let children: Vec<ChildObject> = serde_json::from_value(json!([
            {"id": "a", "data": {"speckle_type": "Base"}},
            {"id": "b", "data": null}
        ]))
        .unwrap();

        let err = records_from_children("url", "root", children).unwrap_err();
        assert!(matches!(err, Error::MissingChildData(id) if id == "b"));
    }

    #[test]
    fn children_become_records() {
        let children: Vec<ChildObject> = serde_json::from_value(json!([
            {"id": "a", "data": {"speckle_type": "Objects.BuiltElements.Duct"}}
        ]))
        .unwrap();

        let records = records_from_children("url", "root", children).unwrap();
        assert_eq!(records[0].speckle_type(), Some("Objects.BuiltElements.Duct"));
    }
}
