// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for object graph handling.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or recomposing objects.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value expected to be a Speckle object was some other JSON type.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// A line of the object stream is not `<id>\t<json>`.
    #[error("malformed object stream line {line}: {reason}")]
    MalformedStream { line: usize, reason: String },

    /// The object stream contained no objects.
    #[error("object stream is empty")]
    EmptyStream,

    /// A referenced object is not present in the object table.
    #[error("referenced object not found: {0}")]
    MissingReference(String),

    /// An object refers back to itself through its references.
    #[error("cyclic reference through object {0}")]
    CyclicReference(String),

    /// A child row returned by the children query has no data payload.
    #[error("child object {0} has no data")]
    MissingChildData(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Name of a JSON value's type, used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
