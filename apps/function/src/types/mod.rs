// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Types exchanged with the automation host.

mod inputs;
mod run_data;

pub use inputs::{inputs_schema, FunctionInputs, SecretString};
pub use run_data::{AutomationRunData, AutomationStatus};
