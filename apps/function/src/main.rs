// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Systems Data Function - Speckle Automate function exporting classified
//! system data to a spreadsheet.
//!
//! The automation host launches the binary with one of two commands:
//!
//! - `run <run-data> <function-inputs> [token]` - run against the triggering
//!   version. JSON arguments may be given inline or as `@path`.
//! - `generate-schema <path>` - write the function inputs JSON schema.
//!
//! The exit code is 0 when the run succeeded and 1 otherwise.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod config;
mod error;
mod services;
mod types;

use config::{Config, LogFormat};
use services::{run_function, AutomationContext};
use types::{inputs_schema, AutomationRunData, AutomationStatus, FunctionInputs};

#[derive(Parser)]
#[command(name = "systems-data-function")]
#[command(about = "Extract Uniclass system data from a Speckle model version", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the function for one automation run.
    Run {
        /// Automation run data as JSON, or `@path` to a JSON file.
        run_data: String,

        /// Function inputs as JSON, or `@path` to a JSON file.
        function_inputs: String,

        /// Token issued by the host for status reports and file results.
        #[arg(env = "SPECKLE_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Write the function inputs JSON schema to a file.
    #[command(alias = "generate_schema")]
    GenerateSchema { path: PathBuf },
}

/// Inline JSON, or the contents of the file named after `@`.
fn read_json_arg(arg: &str) -> anyhow::Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path)),
        None => Ok(arg.to_string()),
    }
}

fn init_logging(format: LogFormat) {
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,systems_data_function=debug".into());

    match format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).pretty().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::from_env();
    init_logging(config.log_format);

    match cli.cmd {
        Commands::GenerateSchema { path } => {
            let schema = serde_json::to_string_pretty(&inputs_schema())?;
            std::fs::write(&path, schema)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote function inputs schema");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            run_data,
            function_inputs,
            token,
        } => {
            let run_data: AutomationRunData = serde_json::from_str(&read_json_arg(&run_data)?)
                .context("Invalid automation run data")?;
            let inputs: FunctionInputs = serde_json::from_str(&read_json_arg(&function_inputs)?)
                .context("Invalid function inputs")?;

            tracing::info!(
                project_id = %run_data.project_id,
                model_id = ?run_data.model_id(),
                version_id = ?run_data.version_id(),
                function_run_id = %run_data.function_run_id,
                fetch_mode = %config.fetch_mode,
                output = %config.output_path.display(),
                "Starting automation run"
            );

            let http = systems_data_client::build_http_client(Duration::from_secs(
                config.request_timeout_secs,
            ))?;
            let mut context = AutomationContext::new(run_data, &token, http);
            let status = run_function(&mut context, &inputs, &config).await;

            tracing::info!(
                status = status.as_str(),
                blob_ids = ?context.blob_ids(),
                context_view = ?context.context_view(),
                "Automation run finished"
            );

            Ok(if status == AutomationStatus::Succeeded {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
