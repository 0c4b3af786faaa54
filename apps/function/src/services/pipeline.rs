// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The function body: fetch, group, export, report.

use systems_data_client::{FetchRequest, Fetcher};
use systems_data_core::{group_by_classification, GroupingOptions};
use systems_data_export::export_tables;

use crate::config::Config;
use crate::error::FunctionError;
use crate::services::automation::AutomationContext;
use crate::types::FunctionInputs;

pub const SUCCESS_MESSAGE: &str = "Data successfully extracted into Uniclass Systems.";

/// Extract classified system data from the triggering version into a workbook.
pub async fn automate_function(
    context: &mut AutomationContext,
    inputs: &FunctionInputs,
    config: &Config,
) -> Result<(), FunctionError> {
    let server_url = config
        .speckle_server_url
        .clone()
        .unwrap_or_else(|| context.run_data().server_url().to_string());

    let fetcher = Fetcher::new(&server_url, inputs.user_token.expose(), context.http().clone());

    if let Err(e) = fetcher.authenticate().await {
        context
            .mark_run_failed(format!(
                "SpeckleWarning: Possibly invalid token - could not authenticate Speckle Client for server {}. Error: {}",
                server_url, e
            ))
            .await?;
        return Ok(());
    }

    let run_data = context.run_data();
    let request = FetchRequest {
        project_id: run_data.project_id.clone(),
        model_url: run_data.project_url(),
        version_id: run_data.version_id().map(str::to_string),
        mode: config.fetch_mode,
    };

    let model = fetcher.fetch(&request).await?;

    let options = GroupingOptions {
        classification_parameter: config.classification_parameter.clone(),
        include_speckle_type: model.include_speckle_type(),
    };
    let groups = group_by_classification(&model.records, &options);

    let output_path = config.output_path.clone();
    let summary =
        tokio::task::spawn_blocking(move || export_tables(&groups, &output_path)).await??;

    context.store_file_result(&summary.path).await?;
    context.set_context_view();
    context.mark_run_success(SUCCESS_MESSAGE).await?;

    Ok(())
}
