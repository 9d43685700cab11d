//! Listing of the tables the segmenter finds, without consolidating.
//!
//! Useful for checking boundary detection against a workbook before running
//! the full pipeline.

use anyhow::Result;
use log::info;

use crate::{cli::TablesArgs, segment::PROVENANCE_COLUMNS, table, workbook};

pub fn execute(args: &TablesArgs) -> Result<()> {
    let (tables, manifest) = workbook::read_and_segment(&args.inputs);
    if tables.is_empty() {
        info!("No tables found in the provided input(s)");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = tables
        .iter()
        .map(|table| {
            vec![
                table.source_file.clone(),
                table.source_sheet.clone(),
                table.table_index.to_string(),
                table.rows.len().to_string(),
                (table.columns.len() - PROVENANCE_COLUMNS.len()).to_string(),
            ]
        })
        .collect();
    let headers = vec![
        "file".to_string(),
        "sheet".to_string(),
        "table".to_string(),
        "rows".to_string(),
        "columns".to_string(),
    ];
    table::print_table(&headers, &rows);
    info!(
        "Found {} table(s) with {} data row(s)",
        manifest.len(),
        manifest.iter().map(|entry| entry.row_count).sum::<usize>()
    );
    Ok(())
}
