// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object transport: downloads an object with its closure and rebuilds it.

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use systems_data_core::{parse_object_stream, recompose, Base, ObjectTable};

use crate::error::{ClientError, Result};

/// Reads objects of one project from a Speckle server.
#[derive(Clone)]
pub struct ServerTransport {
    server_url: String,
    project_id: String,
    token: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for ServerTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerTransport")
            .field("server_url", &self.server_url)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl ServerTransport {
    pub fn new(server_url: &str, project_id: &str, token: &str, http: reqwest::Client) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            token: token.to_string(),
            http,
        }
    }

    fn object_url(&self, object_id: &str) -> String {
        format!("{}/objects/{}/{}", self.server_url, self.project_id, object_id)
    }

    /// Download `object_id` and every object in its closure.
    pub async fn receive_table(&self, object_id: &str) -> Result<ObjectTable> {
        let url = self.object_url(object_id);

        let resp = self
            .http
            .get(&url)
            .header(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", self.token))?,
            )
            .header(ACCEPT, HeaderValue::from_static("text/plain"))
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!(
                "object {} in project {}",
                object_id, self.project_id
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let table = parse_object_stream(&body)?;
        tracing::debug!(object_id, objects = table.len(), "Received object");
        Ok(table)
    }

    /// Download and recompose `object_id`.
    pub async fn receive(&self, object_id: &str) -> Result<Base> {
        let table = self.receive_table(object_id).await?;
        Ok(recompose(object_id, &table)?)
    }
}
