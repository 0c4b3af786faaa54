// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Automation context: run status, file results and context view reporting.

use std::path::Path;
use std::time::Instant;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use systems_data_client::GraphQlClient;

use crate::error::FunctionError;
use crate::types::{AutomationRunData, AutomationStatus, SecretString};

const STATUS_REPORT_MUTATION: &str = r#"
mutation AutomateFunctionRunStatusReport(
    $projectId: String!
    $functionRunId: String!
    $status: AutomateRunStatus!
    $statusMessage: String
    $results: JSONObject
    $contextView: String
) {
    automateFunctionRunStatusReport(input: {
        projectId: $projectId
        functionRunId: $functionRunId
        status: $status
        statusMessage: $statusMessage
        results: $results
        contextView: $contextView
    })
}
"#;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    upload_results: Vec<UploadResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResult {
    blob_id: String,
    #[serde(default)]
    file_name: Option<String>,
}

/// State of one function run and its connection to the host.
#[derive(Debug)]
pub struct AutomationContext {
    run_data: AutomationRunData,
    host: GraphQlClient,
    http: reqwest::Client,
    token: SecretString,
    run_status: AutomationStatus,
    status_message: Option<String>,
    blob_ids: Vec<String>,
    context_view: Option<String>,
    started: Instant,
}

impl AutomationContext {
    /// Context for `run_data`, reporting with the host-issued `token`.
    pub fn new(run_data: AutomationRunData, token: &str, http: reqwest::Client) -> Self {
        let host = GraphQlClient::new(run_data.server_url(), token, http.clone());
        Self {
            run_data,
            host,
            http,
            token: SecretString::new(token),
            run_status: AutomationStatus::Initializing,
            status_message: None,
            blob_ids: Vec::new(),
            context_view: None,
            started: Instant::now(),
        }
    }

    pub fn run_data(&self) -> &AutomationRunData {
        &self.run_data
    }

    /// HTTP client shared by host reports and model data requests.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn run_status(&self) -> AutomationStatus {
        self.run_status
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn blob_ids(&self) -> &[String] {
        &self.blob_ids
    }

    pub fn context_view(&self) -> Option<&str> {
        self.context_view.as_deref()
    }

    /// Report the run as started.
    pub async fn mark_run_running(&mut self) -> Result<(), FunctionError> {
        self.run_status = AutomationStatus::Running;
        self.report_run_status().await
    }

    pub async fn mark_run_success(&mut self, message: impl Into<String>) -> Result<(), FunctionError> {
        self.mark_run(AutomationStatus::Succeeded, message.into()).await
    }

    pub async fn mark_run_failed(&mut self, message: impl Into<String>) -> Result<(), FunctionError> {
        self.mark_run(AutomationStatus::Failed, message.into()).await
    }

    pub async fn mark_run_exception(&mut self, message: impl Into<String>) -> Result<(), FunctionError> {
        self.mark_run(AutomationStatus::Exception, message.into()).await
    }

    async fn mark_run(&mut self, status: AutomationStatus, message: String) -> Result<(), FunctionError> {
        let elapsed = self.started.elapsed();
        match status {
            AutomationStatus::Succeeded => {
                tracing::info!(elapsed_ms = elapsed.as_millis() as u64, message = %message, "Run succeeded")
            }
            _ => tracing::error!(
                status = status.as_str(),
                elapsed_ms = elapsed.as_millis() as u64,
                message = %message,
                "Run did not succeed"
            ),
        }

        self.run_status = status;
        self.status_message = Some(message);
        self.report_run_status().await
    }

    /// Results payload attached to every status report.
    pub fn results(&self) -> Value {
        serde_json::json!({
            "version": 1,
            "values": {
                "objectResults": [],
                "blobIds": self.blob_ids,
            }
        })
    }

    /// Send the current status to the host.
    pub async fn report_run_status(&self) -> Result<(), FunctionError> {
        let _: Value = self
            .host
            .query(
                "AutomateFunctionRunStatusReport",
                STATUS_REPORT_MUTATION,
                serde_json::json!({
                    "projectId": self.run_data.project_id,
                    "functionRunId": self.run_data.function_run_id,
                    "status": self.run_status,
                    "statusMessage": self.status_message,
                    "results": self.results(),
                    "contextView": self.context_view,
                }),
            )
            .await?;

        tracing::debug!(status = self.run_status.as_str(), "Reported run status");
        Ok(())
    }

    /// Upload a file as a project blob and attach it to the run results.
    pub async fn store_file_result(&mut self, path: &Path) -> Result<(), FunctionError> {
        if !path.is_file() {
            return Err(FunctionError::MissingFile(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "result".into());
        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();

        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(XLSX_MIME)?;
        let form = Form::new().part("files", part);

        let url = format!(
            "{}/api/stream/{}/blob",
            self.run_data.server_url(),
            self.run_data.project_id
        );

        let resp = self
            .http
            .post(&url)
            .header(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", self.token.expose()))
                    .map_err(|e| FunctionError::Upload(format!("Invalid token header: {e}")))?,
            )
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FunctionError::Upload(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        let body: UploadResponse = resp.json().await?;
        if body.upload_results.is_empty() {
            return Err(FunctionError::Upload(format!("no upload result for {}", file_name)));
        }

        for result in body.upload_results {
            tracing::info!(
                blob_id = %result.blob_id,
                file_name = result.file_name.as_deref().unwrap_or(file_name.as_str()),
                size,
                "Stored file result"
            );
            self.blob_ids.push(result.blob_id);
        }

        Ok(())
    }

    /// Point the run's result view at the triggering model version.
    pub fn set_context_view(&mut self) {
        match (self.run_data.model_id(), self.run_data.version_id()) {
            (Some(model_id), Some(version_id)) => {
                let view = format!(
                    "/projects/{}/models/{}@{}",
                    self.run_data.project_id, model_id, version_id
                );
                tracing::debug!(context_view = %view, "Set context view");
                self.context_view = Some(view);
            }
            _ => tracing::warn!("Run data has no triggering model version, context view not set"),
        }
    }
}
