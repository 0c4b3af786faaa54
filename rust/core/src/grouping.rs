// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grouping of object records by a classification parameter.
//!
//! Every record whose `parameters` carry the classification parameter becomes
//! one row in the table for that classification value. Rows hold the
//! identifying columns, every other named parameter (labelled with its units
//! when it has any) and finally the classification itself.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::records::{
    ObjectRecord, MODEL_URL_COLUMN, OBJECT_ID_COLUMN, SPECKLE_TYPE_COLUMN,
    VERSION_OBJECT_ID_COLUMN,
};

/// Uniclass systems classification parameter written by the Revit connector.
pub const DEFAULT_CLASSIFICATION_PARAMETER: &str = "Classification.Uniclass.Ss.Description";

/// Grouping configuration.
#[derive(Debug, Clone)]
pub struct GroupingOptions {
    /// Parameter name whose value selects the group.
    pub classification_parameter: String,
    /// Add a `speckle_type` column after the identifying columns.
    pub include_speckle_type: bool,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            classification_parameter: DEFAULT_CLASSIFICATION_PARAMETER.into(),
            include_speckle_type: false,
        }
    }
}

/// One output table: ordered columns and rows keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: IndexSet<String>,
    rows: Vec<IndexMap<String, Value>>,
}

impl Table {
    /// Append a row; new keys extend the column list in order of appearance.
    pub fn push_row(&mut self, row: IndexMap<String, Value>) {
        for key in row.keys() {
            if !self.columns.contains(key) {
                self.columns.insert(key.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> &[IndexMap<String, Value>] {
        &self.rows
    }

    /// Cell value, `None` when the row has no value for the column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Tables keyed by classification value, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationGroups {
    groups: IndexMap<String, Table>,
}

impl ClassificationGroups {
    pub fn get(&self, classification: &str) -> Option<&Table> {
        self.groups.get(classification)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.groups.iter().map(|(name, table)| (name.as_str(), table))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rows across all groups.
    pub fn total_rows(&self) -> usize {
        self.groups.values().map(Table::len).sum()
    }
}

/// Group records into one table per classification value.
pub fn group_by_classification(
    records: &[ObjectRecord],
    options: &GroupingOptions,
) -> ClassificationGroups {
    let mut groups: IndexMap<String, Table> = IndexMap::new();
    let mut unclassified = 0usize;

    for record in records {
        let Some(parameters) = record.parameters() else {
            continue;
        };

        match classify(record, parameters, options) {
            Some((classification, row)) => groups.entry(classification).or_default().push_row(row),
            None => unclassified += 1,
        }
    }

    tracing::info!(
        records = records.len(),
        groups = groups.len(),
        unclassified,
        parameter = %options.classification_parameter,
        "Grouped records by classification"
    );

    ClassificationGroups { groups }
}

fn classify(
    record: &ObjectRecord,
    parameters: &Map<String, Value>,
    options: &GroupingOptions,
) -> Option<(String, IndexMap<String, Value>)> {
    let mut row = IndexMap::new();
    row.insert(MODEL_URL_COLUMN.to_string(), Value::String(record.model_url.clone()));
    row.insert(
        VERSION_OBJECT_ID_COLUMN.to_string(),
        Value::String(record.version_id.clone()),
    );
    row.insert(OBJECT_ID_COLUMN.to_string(), Value::String(record.object_id.clone()));
    if options.include_speckle_type {
        let speckle_type = record
            .speckle_type()
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null);
        row.insert(SPECKLE_TYPE_COLUMN.to_string(), speckle_type);
    }

    let mut classification = None;

    for parameter in parameters.values() {
        let Value::Object(parameter) = parameter else {
            continue;
        };
        let Some(name) = parameter.get("name").and_then(Value::as_str) else {
            continue;
        };
        let value = parameter.get("value").cloned().unwrap_or(Value::Null);

        if name == options.classification_parameter {
            classification = classification_text(&value);
        } else {
            row.insert(parameter_label(name, parameter.get("units")), value);
        }
    }

    let classification = classification?;
    row.insert(
        options.classification_parameter.clone(),
        Value::String(classification.clone()),
    );
    Some((classification, row))
}

/// `Length (mm)` for parameters with units, `Mark` otherwise.
fn parameter_label(name: &str, units: Option<&Value>) -> String {
    match units.and_then(Value::as_str) {
        Some(units) if !units.is_empty() => format!("{} ({})", name, units),
        _ => name.to_string(),
    }
}

/// Group key for a classification value.
///
/// Empty values select no group: null, `""`, `false`, zero and arrays or
/// objects. Any other string is used as it is, whitespace included; other
/// numbers and `true` are rendered as text.
fn classification_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".into()),
        _ => None,
    }
}
