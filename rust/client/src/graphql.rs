// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Speckle GraphQL API client.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use systems_data_core::ChildObject;

use crate::error::{ClientError, Result};

const ACTIVE_USER_QUERY: &str = include_str!("../graphql/ActiveUser.graphql");
const VERSION_QUERY: &str = include_str!("../graphql/Version.graphql");
const STREAM_QUERY: &str = include_str!("../graphql/Stream.graphql");
const COMMIT_QUERY: &str = include_str!("../graphql/Commit.graphql");

/// Page size for object children queries.
pub const CHILDREN_PAGE_SIZE: usize = 1000;

/// GraphQL client bound to one server and token.
#[derive(Clone)]
pub struct GraphQlClient {
    server_url: String,
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for GraphQlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// The user a token belongs to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActiveUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A model version and the root object it references.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub id: String,
    pub referenced_object: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorMessage>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveUserData {
    active_user: Option<ActiveUser>,
}

#[derive(Debug, Deserialize)]
struct VersionData {
    project: Option<VersionProject>,
}

#[derive(Debug, Deserialize)]
struct VersionProject {
    version: Option<VersionInfo>,
}

#[derive(Debug, Deserialize)]
struct StreamData {
    project: Option<StreamProject>,
}

#[derive(Debug, Deserialize)]
struct StreamProject {
    versions: VersionCollection,
}

#[derive(Debug, Deserialize)]
struct VersionCollection {
    items: Vec<VersionInfo>,
}

#[derive(Debug, Deserialize)]
struct CommitData {
    project: Option<CommitProject>,
}

#[derive(Debug, Deserialize)]
struct CommitProject {
    object: Option<CommitObject>,
}

#[derive(Debug, Deserialize)]
struct CommitObject {
    children: ChildCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChildCollection {
    #[serde(default)]
    total_count: Option<u64>,
    cursor: Option<String>,
    objects: Vec<ChildObject>,
}

impl GraphQlClient {
    /// Create a client for `server_url` (without the `/graphql` suffix).
    pub fn new(server_url: &str, token: &str, http: reqwest::Client) -> Self {
        let server_url = server_url.trim_end_matches('/').to_string();
        Self {
            endpoint: format!("{}/graphql", server_url),
            server_url,
            token: token.to_string(),
            http,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Build authorization and content headers.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Run a query or mutation and return its `data`.
    ///
    /// GraphQL errors alongside data are logged; a response without data is
    /// an error carrying the error messages.
    pub async fn query<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let resp = self
            .http
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&serde_json::json!({
                "query": query,
                "operationName": operation_name,
                "variables": variables,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                url: self.endpoint.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphQlResponse<T> = resp.json().await?;
        let messages = body
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");

        if !messages.is_empty() {
            tracing::warn!(
                operation = operation_name,
                errors = %messages,
                "GraphQL response returned errors"
            );
        }

        body.data.ok_or_else(|| {
            ClientError::GraphQl(if messages.is_empty() {
                format!("{} returned no data", operation_name)
            } else {
                messages
            })
        })
    }

    /// Resolve the user the token belongs to.
    pub async fn active_user(&self) -> Result<ActiveUser> {
        let data: ActiveUserData = self
            .query("ActiveUser", ACTIVE_USER_QUERY, serde_json::json!({}))
            .await?;

        data.active_user.ok_or_else(|| {
            ClientError::Authentication(format!(
                "token is not associated with a user on {}",
                self.server_url
            ))
        })
    }

    /// Look up a specific version of a project.
    pub async fn version(&self, project_id: &str, version_id: &str) -> Result<VersionInfo> {
        let data: VersionData = self
            .query(
                "Version",
                VERSION_QUERY,
                serde_json::json!({ "projectId": project_id, "versionId": version_id }),
            )
            .await?;

        data.project
            .and_then(|p| p.version)
            .ok_or_else(|| {
                ClientError::NotFound(format!("version {} in project {}", version_id, project_id))
            })
    }

    /// The most recent version of a project.
    pub async fn latest_version(&self, project_id: &str) -> Result<VersionInfo> {
        let data: StreamData = self
            .query(
                "Stream",
                STREAM_QUERY,
                serde_json::json!({ "streamId": project_id }),
            )
            .await?;

        data.project
            .and_then(|p| p.versions.items.into_iter().next())
            .ok_or_else(|| ClientError::NotFound(format!("versions of project {}", project_id)))
    }

    /// Every child object of `object_id`, following the cursor to the end.
    pub async fn object_children(
        &self,
        project_id: &str,
        object_id: &str,
    ) -> Result<Vec<ChildObject>> {
        let mut children = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: CommitData = self
                .query(
                    "Commit",
                    COMMIT_QUERY,
                    serde_json::json!({
                        "streamId": project_id,
                        "objectId": object_id,
                        "limit": CHILDREN_PAGE_SIZE,
                        "cursor": cursor,
                    }),
                )
                .await?;

            let page = data
                .project
                .and_then(|p| p.object)
                .map(|o| o.children)
                .ok_or_else(|| {
                    ClientError::NotFound(format!("object {} in project {}", object_id, project_id))
                })?;

            let received = page.objects.len();
            children.extend(page.objects);

            tracing::debug!(
                received,
                total = ?page.total_count,
                so_far = children.len(),
                "Received object children page"
            );

            match page.cursor {
                Some(next) if received == CHILDREN_PAGE_SIZE => cursor = Some(next),
                _ => break,
            }
        }

        Ok(children)
    }
}
