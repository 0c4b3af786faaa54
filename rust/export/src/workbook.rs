// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Workbook writer: one worksheet per classification table.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};
use serde::Serialize;
use serde_json::Value;
use systems_data_core::{ClassificationGroups, Table};

use crate::error::{ExportError, Result};
use crate::sheet_name::SheetNamer;

/// Longest text a single cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// What was written where.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub sheets: Vec<SheetSummary>,
}

impl ExportSummary {
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.rows).sum()
    }
}

/// One written worksheet.
#[derive(Debug, Clone, Serialize)]
pub struct SheetSummary {
    /// Classification value the sheet holds.
    pub classification: String,
    /// Worksheet name as written.
    pub sheet_name: String,
    pub rows: usize,
}

/// Write every table to its own worksheet in a new workbook at `path`.
pub fn export_tables(groups: &ClassificationGroups, path: impl AsRef<Path>) -> Result<ExportSummary> {
    let path = path.as_ref();
    if groups.is_empty() {
        return Err(ExportError::NoTables);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x00D9_E1F2))
        .set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let mut namer = SheetNamer::new();
    let mut sheets = Vec::with_capacity(groups.len());

    for (classification, table) in groups.iter() {
        let sheet_name = namer.name_for(classification);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet_name)?;
        write_table(worksheet, table, &header_format)?;

        tracing::debug!(
            classification,
            sheet = %sheet_name,
            rows = table.len(),
            "Wrote worksheet"
        );

        sheets.push(SheetSummary {
            classification: classification.to_string(),
            sheet_name,
            rows: table.len(),
        });
    }

    workbook.save(path)?;

    let summary = ExportSummary {
        path: path.to_path_buf(),
        sheets,
    };

    tracing::info!(
        path = %path.display(),
        sheets = summary.sheets.len(),
        rows = summary.total_rows(),
        "Exported workbook"
    );

    Ok(summary)
}

fn write_table(worksheet: &mut Worksheet, table: &Table, header_format: &Format) -> Result<()> {
    let columns: Vec<&str> = table.columns().collect();

    if columns.len() > MAX_COLUMNS {
        return Err(ExportError::TooLarge(format!(
            "{} columns exceeds the limit of {}",
            columns.len(),
            MAX_COLUMNS
        )));
    }
    if table.len() + 1 > MAX_ROWS {
        return Err(ExportError::TooLarge(format!(
            "{} rows exceeds the limit of {}",
            table.len(),
            MAX_ROWS - 1
        )));
    }

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, header_format)?;
    }

    for (index, row) in table.rows().iter().enumerate() {
        let row_num = (index + 1) as u32;
        for (col, name) in columns.iter().enumerate() {
            if let Some(value) = row.get(*name) {
                write_cell(worksheet, row_num, col as u16, value)?;
            }
        }
    }

    if !columns.is_empty() {
        worksheet.set_freeze_panes(1, 0)?;
        worksheet.autofilter(0, 0, table.len() as u32, (columns.len() - 1) as u16)?;
    }
    worksheet.autofit();

    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => {
                worksheet.write_number(row, col, f)?;
            }
            _ => {
                worksheet.write_string(row, col, cap_text(&n.to_string()))?;
            }
        },
        Value::String(s) => {
            worksheet.write_string(row, col, cap_text(s))?;
        }
        Value::Array(_) | Value::Object(_) => {
            worksheet.write_string(row, col, cap_text(&value.to_string()))?;
        }
    }
    Ok(())
}

fn cap_text(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        text.to_string()
    } else {
        text.chars().take(MAX_CELL_CHARS).collect()
    }
}
