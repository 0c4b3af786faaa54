// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Systems Data Export
//!
//! Writes classification tables to an `.xlsx` workbook, one worksheet per
//! classification. Worksheet names are derived from the classification under
//! the format's 31-character limit.

pub mod error;
pub mod sheet_name;
pub mod workbook;

pub use error::{ExportError, Result};
pub use sheet_name::{truncate_sheet_name, SheetNamer, MAX_SHEET_NAME_CHARS};
pub use workbook::{export_tables, ExportSummary, SheetSummary, MAX_CELL_CHARS};
