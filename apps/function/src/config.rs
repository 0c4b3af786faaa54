// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Function configuration loaded from environment variables.

use std::path::PathBuf;

use systems_data_client::FetchMode;
use systems_data_core::DEFAULT_CLASSIFICATION_PARAMETER;

/// Log output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Function configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server used for model data; the run's server when unset.
    pub speckle_server_url: Option<String>,
    /// Where the workbook is written.
    pub output_path: PathBuf,
    /// Object retrieval strategy.
    pub fetch_mode: FetchMode,
    /// Parameter whose value names each output sheet.
    pub classification_parameter: String,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            speckle_server_url: lookup("SPECKLE_SERVER_URL")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
            output_path: lookup("OUTPUT_PATH")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "systems_data.xlsx".into())
                .into(),
            fetch_mode: match lookup("FETCH_MODE") {
                Some(mode) => mode.parse().unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Falling back to transport fetch mode");
                    FetchMode::Transport
                }),
                None => FetchMode::Transport,
            },
            classification_parameter: lookup("CLASSIFICATION_PARAMETER")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CLASSIFICATION_PARAMETER.into()),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "300".into())
                .parse()
                .unwrap_or(300),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }
}
