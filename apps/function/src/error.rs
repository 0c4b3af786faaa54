// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the function run.

use std::path::PathBuf;

use thiserror::Error;

/// Function error types.
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("Server error: {0}")]
    Client(#[from] systems_data_client::ClientError),

    #[error("Export error: {0}")]
    Export(#[from] systems_data_export::ExportError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Result file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("File upload failed: {0}")]
    Upload(String),

    #[error("Join error")]
    Join(#[from] tokio::task::JoinError),
}
