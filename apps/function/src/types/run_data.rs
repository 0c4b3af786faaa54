// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Automation run data supplied by the host.

use serde::{Deserialize, Serialize};

/// Context of one automation run.
///
/// Older hosts send the triggering model and version as flat fields, newer
/// ones as a list of triggers; both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRunData {
    pub project_id: String,
    pub speckle_server_url: String,
    #[serde(default)]
    pub automation_id: Option<String>,
    #[serde(default)]
    pub automation_run_id: Option<String>,
    pub function_run_id: String,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub triggers: Vec<AutomationTrigger>,
}

/// A trigger that started the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationTrigger {
    pub trigger_type: String,
    pub payload: TriggerPayload,
}

/// Model version a trigger refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPayload {
    pub model_id: String,
    pub version_id: String,
}

impl AutomationRunData {
    fn first_trigger(&self) -> Option<&TriggerPayload> {
        self.triggers.first().map(|t| &t.payload)
    }

    /// Model that triggered the run.
    pub fn model_id(&self) -> Option<&str> {
        self.model_id
            .as_deref()
            .or_else(|| self.first_trigger().map(|p| p.model_id.as_str()))
    }

    /// Version that triggered the run.
    pub fn version_id(&self) -> Option<&str> {
        self.version_id
            .as_deref()
            .or_else(|| self.first_trigger().map(|p| p.version_id.as_str()))
    }

    /// Server URL without a trailing slash.
    pub fn server_url(&self) -> &str {
        self.speckle_server_url.trim_end_matches('/')
    }

    /// Project page on the server, written to the `Model URL` column.
    pub fn project_url(&self) -> String {
        format!("{}/projects/{}", self.server_url(), self.project_id)
    }
}

/// Run status as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationStatus {
    Initializing,
    Running,
    Succeeded,
    Failed,
    Exception,
}

impl AutomationStatus {
    /// Whether the run has reached an outcome.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            AutomationStatus::Succeeded | AutomationStatus::Failed | AutomationStatus::Exception
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AutomationStatus::Initializing => "INITIALIZING",
            AutomationStatus::Running => "RUNNING",
            AutomationStatus::Succeeded => "SUCCEEDED",
            AutomationStatus::Failed => "FAILED",
            AutomationStatus::Exception => "EXCEPTION",
        }
    }
}
