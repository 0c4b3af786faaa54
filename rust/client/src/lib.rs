// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Systems Data Client
//!
//! Access to a Speckle server for model data extraction:
//!
//! - [`GraphQlClient`]: authenticated GraphQL queries (user, versions,
//!   object children)
//! - [`ServerTransport`]: object download and recomposition
//! - [`Fetcher`]: version resolution and record retrieval using either
//!   strategy ([`FetchMode`])

use std::time::Duration;

pub mod error;
pub mod fetcher;
pub mod graphql;
pub mod transport;

pub use error::{ClientError, Result};
pub use fetcher::{FetchMode, FetchRequest, FetchedModel, Fetcher};
pub use graphql::{ActiveUser, GraphQlClient, VersionInfo};
pub use transport::ServerTransport;

/// Shared HTTP client with a request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("systems-data/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
