// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fetch stage: version resolution and record retrieval.

use std::fmt;
use std::str::FromStr;

use systems_data_core::{
    collect_object_ids, records_from_children, records_from_objects, ObjectRecord,
    TraversalOptions,
};

use crate::error::{ClientError, Result};
use crate::graphql::{ActiveUser, GraphQlClient};
use crate::transport::ServerTransport;

/// How objects are retrieved from the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// Object transport download and recomposition, one request per object.
    #[default]
    Transport,
    /// Raw GraphQL children query of the root object.
    GraphQl,
}

impl FromStr for FetchMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transport" | "sdk" => Ok(FetchMode::Transport),
            "graphql" | "gql" => Ok(FetchMode::GraphQl),
            other => Err(ClientError::UnknownFetchMode(other.to_string())),
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::Transport => f.write_str("transport"),
            FetchMode::GraphQl => f.write_str("graphql"),
        }
    }
}

/// What to fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub project_id: String,
    /// Value written to the `Model URL` column.
    pub model_url: String,
    /// Triggering version; the latest version is used when absent.
    pub version_id: Option<String>,
    pub mode: FetchMode,
}

/// Records of one model version.
#[derive(Debug, Clone)]
pub struct FetchedModel {
    /// Root object id of the fetched version.
    pub version_object_id: String,
    pub records: Vec<ObjectRecord>,
    pub mode: FetchMode,
}

impl FetchedModel {
    /// The GraphQL children rows carry their type, so it gets a column.
    pub fn include_speckle_type(&self) -> bool {
        self.mode == FetchMode::GraphQl
    }
}

/// Retrieves model data from one server with one token.
#[derive(Clone)]
pub struct Fetcher {
    graphql: GraphQlClient,
    token: String,
    http: reqwest::Client,
    traversal: TraversalOptions,
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("graphql", &self.graphql)
            .field("traversal", &self.traversal)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    pub fn new(server_url: &str, token: &str, http: reqwest::Client) -> Self {
        Self {
            graphql: GraphQlClient::new(server_url, token, http.clone()),
            token: token.to_string(),
            http,
            traversal: TraversalOptions::default(),
        }
    }

    /// Check the token against the server.
    pub async fn authenticate(&self) -> Result<ActiveUser> {
        let user = self.graphql.active_user().await?;
        tracing::info!(
            server = %self.graphql.server_url(),
            user = %user.id,
            "Authenticated"
        );
        Ok(user)
    }

    /// Root object id of the given version, or of the latest version.
    pub async fn resolve_root_object(
        &self,
        project_id: &str,
        version_id: Option<&str>,
    ) -> Result<String> {
        let version = match version_id {
            Some(version_id) => self.graphql.version(project_id, version_id).await?,
            None => self.graphql.latest_version(project_id).await?,
        };

        tracing::info!(
            project_id,
            version_id = %version.id,
            root_object = %version.referenced_object,
            "Resolved version root object"
        );
        Ok(version.referenced_object)
    }

    /// Resolve the version and retrieve one record per object of interest.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchedModel> {
        let root_id = self
            .resolve_root_object(&request.project_id, request.version_id.as_deref())
            .await?;

        let records = match request.mode {
            FetchMode::Transport => self.fetch_via_transport(request, &root_id).await?,
            FetchMode::GraphQl => {
                let children = self
                    .graphql
                    .object_children(&request.project_id, &root_id)
                    .await?;
                records_from_children(&request.model_url, &root_id, children)?
            }
        };

        tracing::info!(
            mode = %request.mode,
            records = records.len(),
            "Fetched object records"
        );

        Ok(FetchedModel {
            version_object_id: root_id,
            records,
            mode: request.mode,
        })
    }

    async fn fetch_via_transport(
        &self,
        request: &FetchRequest,
        root_id: &str,
    ) -> Result<Vec<ObjectRecord>> {
        let transport = ServerTransport::new(
            self.graphql.server_url(),
            &request.project_id,
            &self.token,
            self.http.clone(),
        );

        let root = transport.receive(root_id).await?;
        let object_ids = collect_object_ids(&root, &self.traversal);

        let mut objects = Vec::with_capacity(object_ids.len());
        for object_id in object_ids {
            let object = transport.receive(&object_id).await?;
            objects.push((object_id, object));
        }

        Ok(records_from_objects(
            &request.model_url,
            root_id,
            objects.iter().map(|(id, object)| (id.clone(), object)),
        ))
    }
}
