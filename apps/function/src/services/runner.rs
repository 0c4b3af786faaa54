// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runs the function inside an automation context and settles its outcome.

use crate::config::Config;
use crate::error::FunctionError;
use crate::services::automation::AutomationContext;
use crate::services::pipeline::automate_function;
use crate::types::{AutomationStatus, FunctionInputs};

/// Run the function and make sure the host receives a final status.
///
/// An error marks the run failed, a panicked worker marks it as an
/// exception; returning without a reported outcome marks it succeeded.
pub async fn run_function(
    context: &mut AutomationContext,
    inputs: &FunctionInputs,
    config: &Config,
) -> AutomationStatus {
    if let Err(e) = context.mark_run_running().await {
        tracing::warn!(error = %e, "Could not report run start");
    }

    let outcome = automate_function(context, inputs, config).await;
    settle(context, outcome).await
}

/// Report the final status for `outcome` unless the function already did.
async fn settle(
    context: &mut AutomationContext,
    outcome: Result<(), FunctionError>,
) -> AutomationStatus {
    let settled = match outcome {
        Ok(()) if context.run_status().is_final() => Ok(()),
        Ok(()) => context.mark_run_success("Function completed without reporting a result.").await,
        Err(e @ FunctionError::Join(_)) => {
            tracing::error!(error = %e, "Function crashed");
            context
                .mark_run_exception(format!("Function crashed. Check the automation run logs for details. {}", e))
                .await
        }
        Err(e) => {
            tracing::error!(error = %e, "Function failed");
            context
                .mark_run_failed(format!("Function error. Check the automation run logs for details. {}", e))
                .await
        }
    };

    if let Err(e) = settled {
        tracing::error!(error = %e, "Could not report run status");
    }

    context.run_status()
}
