//! Table segmentation: splitting a raw worksheet grid into independent tables.
//!
//! Survey exports frequently stack several unrelated tables vertically in one
//! worksheet, separated by blank rows. [`segment_sheet()`] locates those
//! blank-row boundaries, slices each region into its own table, strips fully
//! blank rows and columns, promotes the first row to a header, and tags every
//! table with three provenance columns so each consolidated row can be traced
//! back to its originating file, sheet, and table.

use std::collections::BTreeSet;

use log::debug;

/// Injected column holding the originating file name.
pub const SOURCE_FILE_COLUMN: &str = "Nome do Arquivo de Origem";
/// Injected column holding the originating worksheet name.
pub const SOURCE_SHEET_COLUMN: &str = "Nome da Planilha de Origem";
/// Injected column holding the 1-based table index within its sheet.
pub const TABLE_INDEX_COLUMN: &str = "Índice da Tabela na Planilha";

/// The three provenance columns in their fixed leading order.
pub const PROVENANCE_COLUMNS: [&str; 3] = [
    SOURCE_FILE_COLUMN,
    SOURCE_SHEET_COLUMN,
    TABLE_INDEX_COLUMN,
];

/// A raw worksheet as decoded by the workbook reader: rows of optional text
/// cells, blank cells represented as `None`.
pub type SheetGrid = Vec<Vec<Option<String>>>;

/// One table sliced out of a worksheet, with provenance columns injected at
/// the front. Every row holds exactly one value (possibly `None`) per column.
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    pub source_file: String,
    pub source_sheet: String,
    pub table_index: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Ground-truth row count for one extracted table, captured at segmentation
/// time and used later by the integrity validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub file: String,
    pub sheet: String,
    pub table_index: usize,
    pub row_count: usize,
}

pub fn is_blank(cell: &Option<String>) -> bool {
    match cell {
        None => true,
        Some(text) => text.trim().is_empty(),
    }
}

fn is_blank_row(row: &[Option<String>]) -> bool {
    row.iter().all(is_blank)
}

/// Splits one worksheet grid into tables delimited by fully blank rows.
///
/// Table indices are 1-based and restart for every sheet. Slices that are
/// empty after cleanup, or left with zero data rows after header promotion,
/// are discarded and do not consume an index.
pub fn segment_sheet(
    file: &str,
    sheet: &str,
    grid: &SheetGrid,
) -> (Vec<ExtractedTable>, Vec<ManifestEntry>) {
    let mut tables = Vec::new();
    let mut manifest = Vec::new();
    if grid.is_empty() {
        return (tables, manifest);
    }

    let blank_rows: BTreeSet<usize> = grid
        .iter()
        .enumerate()
        .filter(|(_, row)| is_blank_row(row))
        .map(|(idx, _)| idx)
        .collect();

    let mut boundaries: Vec<usize> = std::iter::once(0).chain(blank_rows.iter().copied()).collect();
    boundaries.dedup();
    boundaries.push(grid.len());

    let mut table_index = 1usize;
    for window in boundaries.windows(2) {
        let (mut start, end) = (window[0], window[1]);
        // A boundary that is itself a blank row is a separator, not data.
        if blank_rows.contains(&start) {
            start += 1;
        }
        if start >= end {
            continue;
        }

        let Some(table) = extract_table(file, sheet, table_index, &grid[start..end]) else {
            continue;
        };
        debug!(
            "{file} -> {sheet} -> Tabela {table_index}: {} row(s), {} column(s)",
            table.rows.len(),
            table.columns.len()
        );
        manifest.push(ManifestEntry {
            file: file.to_string(),
            sheet: sheet.to_string(),
            table_index,
            row_count: table.rows.len(),
        });
        tables.push(table);
        table_index += 1;
    }

    (tables, manifest)
}

/// Segments every sheet of one workbook, restarting the table index per sheet.
pub fn segment_sheets(
    file: &str,
    sheets: &[(String, SheetGrid)],
) -> (Vec<ExtractedTable>, Vec<ManifestEntry>) {
    let mut tables = Vec::new();
    let mut manifest = Vec::new();
    for (sheet, grid) in sheets {
        let (sheet_tables, sheet_manifest) = segment_sheet(file, sheet, grid);
        tables.extend(sheet_tables);
        manifest.extend(sheet_manifest);
    }
    (tables, manifest)
}

/// Cleans one slice, promotes its header, and injects provenance columns.
/// Returns `None` when the slice holds no data table.
fn extract_table(
    file: &str,
    sheet: &str,
    table_index: usize,
    slice: &[Vec<Option<String>>],
) -> Option<ExtractedTable> {
    let mut rows: Vec<&Vec<Option<String>>> =
        slice.iter().filter(|row| !is_blank_row(row)).collect();
    if rows.is_empty() {
        return None;
    }

    let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    let kept_columns: Vec<usize> = (0..width)
        .filter(|&col| {
            rows.iter()
                .any(|row| !is_blank(row.get(col).unwrap_or(&None)))
        })
        .collect();
    if kept_columns.is_empty() {
        return None;
    }

    let project = |row: &[Option<String>]| -> Vec<Option<String>> {
        kept_columns
            .iter()
            .map(|&col| row.get(col).cloned().unwrap_or(None))
            .collect()
    };

    // The first surviving row always has a non-blank cell once blank rows are
    // dropped, but the header promotion contract still guards the case.
    let names = if rows[0].iter().any(|cell| !is_blank(cell)) {
        let header = project(rows.remove(0).as_slice());
        promote_header(&header)
    } else {
        (0..kept_columns.len())
            .map(|idx| format!("Column_{idx}"))
            .collect()
    };
    if rows.is_empty() {
        return None;
    }

    let mut columns = Vec::with_capacity(names.len() + PROVENANCE_COLUMNS.len());
    columns.extend(PROVENANCE_COLUMNS.iter().map(|name| name.to_string()));
    columns.extend(names);

    let data_rows: Vec<Vec<Option<String>>> = rows
        .iter()
        .map(|row| {
            let mut full = Vec::with_capacity(columns.len());
            full.push(Some(file.to_string()));
            full.push(Some(sheet.to_string()));
            full.push(Some(table_index.to_string()));
            full.extend(project(row.as_slice()));
            full
        })
        .collect();

    Some(ExtractedTable {
        source_file: file.to_string(),
        source_sheet: sheet.to_string(),
        table_index,
        columns,
        rows: data_rows,
    })
}

/// Turns a promoted header row into unique, trimmed column names. Blank cells
/// become `Column_<i>`; a repeated name gets its positional index appended.
fn promote_header(header: &[Option<String>]) -> Vec<String> {
    let mut names = Vec::with_capacity(header.len());
    for (idx, cell) in header.iter().enumerate() {
        let base = match cell {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => format!("Column_{idx}"),
        };
        let name = if names.contains(&base) {
            format!("{base}_{idx}")
        } else {
            base
        };
        names.push(name);
    }
    names
}
