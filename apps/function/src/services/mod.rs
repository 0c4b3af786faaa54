// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service modules for the automation run.

pub mod automation;
pub mod pipeline;
pub mod runner;

pub use automation::AutomationContext;
pub use runner::run_function;
