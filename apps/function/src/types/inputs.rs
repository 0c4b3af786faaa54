// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Function inputs defined by the function author.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A string kept out of logs.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("**********")
    }
}

impl Serialize for SecretString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("**********")
    }
}

/// Values the host supplies for this function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInputs {
    /// Token with read scope on the project, used for model data access.
    pub user_token: SecretString,
}

/// JSON schema of [`FunctionInputs`], published with the function.
pub fn inputs_schema() -> serde_json::Value {
    serde_json::json!({
        "title": "FunctionInputs",
        "type": "object",
        "properties": {
            "userToken": {
                "title": "Insert your user token",
                "description": "The token should have read-write scope for streams. It will be used for authorization of graphQL.",
                "type": "string",
                "writeOnly": true,
                "format": "password"
            }
        },
        "required": ["userToken"]
    })
}
