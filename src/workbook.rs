//! Workbook decoding and encoding.
//!
//! Reading goes through `calamine`, which handles `.xlsx`, `.xls`, and `.ods`
//! transparently; every worksheet is flattened into a grid of optional text
//! cells before segmentation. Writing goes through `rust_xlsxwriter` and
//! produces a single-sheet workbook with a header row and no index column.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use log::warn;
use rust_xlsxwriter::Workbook;
use thiserror::Error;

use crate::{
    consolidate::UnifiedTable,
    segment::{self, ExtractedTable, ManifestEntry, SheetGrid},
};

/// Sheet name of the consolidated output workbook.
pub const OUTPUT_SHEET_NAME: &str = "Consolidated_Data";

#[derive(Debug, Error)]
#[error("failed to open workbook {}: {source}", path.display())]
pub struct OpenWorkbookError {
    path: PathBuf,
    #[source]
    source: calamine::Error,
}

/// Decodes every worksheet of one workbook into a raw grid. A sheet whose
/// range cannot be read is skipped with a warning; only a workbook that
/// cannot be opened at all is an error.
pub fn read_workbook_grids(path: &Path) -> Result<Vec<(String, SheetGrid)>, OpenWorkbookError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| OpenWorkbookError {
        path: path.to_path_buf(),
        source,
    })?;
    let mut grids = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&sheet) {
            Ok(range) => range,
            Err(err) => {
                warn!("Skipping sheet '{sheet}' in {path:?}: {err}");
                continue;
            }
        };
        let grid: SheetGrid = range
            .rows()
            .map(|row| row.iter().map(cell_to_text).collect())
            .collect();
        grids.push((sheet, grid));
    }
    Ok(grids)
}

/// Reads and segments every input workbook. Files that fail to decode are
/// skipped with a warning so one bad upload does not abort the batch; the
/// remaining inputs still produce results.
pub fn read_and_segment(inputs: &[PathBuf]) -> (Vec<ExtractedTable>, Vec<ManifestEntry>) {
    let mut tables = Vec::new();
    let mut manifest = Vec::new();
    for input in inputs {
        let grids = match read_workbook_grids(input) {
            Ok(grids) => grids,
            Err(err) => {
                warn!("Skipping input: {err}");
                continue;
            }
        };
        let file_name = display_file_name(input);
        let (file_tables, file_manifest) = segment::segment_sheets(&file_name, &grids);
        tables.extend(file_tables);
        manifest.extend(file_manifest);
    }
    (tables, manifest)
}

/// Provenance uses the bare file name, matching what an upload form shows.
fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Normalizes one decoded cell to its text representation, or `None` when
/// blank. Whole floats render without a fractional part so numeric headers
/// and identifiers round-trip the way spreadsheet UIs display them.
fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(text) => {
            if text.trim().is_empty() {
                None
            } else {
                Some(text.clone())
            }
        }
        Data::Float(value) => {
            if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                Some(format!("{}", *value as i64))
            } else {
                Some(value.to_string())
            }
        }
        Data::Int(value) => Some(value.to_string()),
        Data::Bool(value) => Some(value.to_string()),
        Data::DateTime(value) => Some(
            value
                .as_datetime()
                .map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| value.as_f64().to_string()),
        ),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Some(text.clone()),
        Data::Error(err) => Some(err.to_string()),
    }
}

/// Writes the unified table to a single-sheet workbook. This is the only
/// fatal failure point of the pipeline besides argument handling.
pub fn write_unified(path: &Path, table: &UnifiedTable) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(OUTPUT_SHEET_NAME)
        .context("Naming output sheet")?;
    for (col, name) in table.columns.iter().enumerate() {
        sheet
            .write_string(0, col as u16, name)
            .with_context(|| format!("Writing header '{name}'"))?;
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if let Some(text) = cell {
                sheet
                    .write_string(row_idx as u32 + 1, col_idx as u16, text)
                    .with_context(|| format!("Writing row {}", row_idx + 1))?;
            }
        }
    }
    workbook
        .save(path)
        .with_context(|| format!("Saving workbook to {path:?}"))?;
    Ok(())
}
