//! Schema-aware consolidation of extracted tables into one unified table.
//!
//! Consolidation is a two-pass batch job: pass one drains the table list and
//! accumulates the union of all column names, pass two aligns every table to
//! the planned target order and appends its rows into the backing store. The
//! full union must be known before any row is written, which is why the
//! tables are materialized up front instead of streamed.

use std::{collections::HashSet, fs, fs::File, path::Path};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{info, warn};

use crate::{
    cli::ConsolidateArgs,
    order,
    schema::ReferenceSchema,
    segment::{ExtractedTable, PROVENANCE_COLUMNS},
    validate, workbook,
};

/// Anomaly report emitted when every table carried all target columns.
pub const NO_ANOMALIES_REPORT: &str = "Nenhuma anomalia detectada.";
/// Report emitted when the inputs yielded no columns at all.
pub const NO_DATA_REPORT: &str = "No data found in any tables";

/// The consolidated result: all rows from all tables, aligned to one column
/// order, every cell text or null. Provenance columns are ordinary columns.
#[derive(Debug, Clone, Default)]
pub struct UnifiedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl UnifiedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Private backing store for one consolidation run: single writer, all cells
/// text, rows appended in processing order and read back in schema order.
struct UnifiedStore {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl UnifiedStore {
    fn create(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    fn append(&mut self, row: Vec<Option<String>>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    fn into_table(self) -> UnifiedTable {
        UnifiedTable {
            columns: self.columns,
            rows: self.rows,
        }
    }
}

/// Consolidates the extracted tables into one unified table and an anomaly
/// report. Missing columns are anomalies, never errors; an empty input is a
/// normal outcome reported through the no-data sentinel.
pub fn consolidate(
    tables: &[ExtractedTable],
    reference: &ReferenceSchema,
) -> (UnifiedTable, String) {
    // Pass 1: discover the full column union before any row is written.
    let mut discovered: HashSet<String> = HashSet::new();
    let mut retained: Vec<(Vec<String>, &ExtractedTable)> = Vec::new();
    for table in tables {
        if table.rows.is_empty() {
            continue;
        }
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        discovered.extend(columns.iter().cloned());
        retained.push((columns, table));
    }

    if discovered.is_empty() {
        return (UnifiedTable::default(), NO_DATA_REPORT.to_string());
    }

    let target = order::plan_column_order(&discovered, reference);
    info!(
        "Consolidating {} table(s) into {} column(s)",
        retained.len(),
        target.len()
    );

    // Pass 2: align each table to the target order and load its rows.
    let mut store = UnifiedStore::create(target.clone());
    let mut anomalies: Vec<String> = Vec::new();
    for (columns, table) in &retained {
        let mut missing: Vec<&String> = target
            .iter()
            .filter(|name| {
                !columns.contains(*name) && !PROVENANCE_COLUMNS.contains(&name.as_str())
            })
            .collect();
        if !missing.is_empty() {
            missing.sort();
            anomalies.push(format!(
                "{} -> {} -> Tabela {}: [{}]",
                table.source_file,
                table.source_sheet,
                table.table_index,
                missing.iter().map(|name| format!("'{name}'")).join(", ")
            ));
        }

        let slots: Vec<Option<usize>> = target
            .iter()
            .map(|name| columns.iter().position(|column| column == name))
            .collect();
        for row in &table.rows {
            let mut aligned = Vec::with_capacity(slots.len());
            for slot in &slots {
                let cell = slot
                    .and_then(|idx| row.get(idx))
                    .and_then(normalize_cell);
                aligned.push(cell);
            }
            store.append(aligned);
        }
    }

    let report = if anomalies.is_empty() {
        NO_ANOMALIES_REPORT.to_string()
    } else {
        anomalies.join("\n")
    };
    (store.into_table(), report)
}

/// Normalizes a stored cell: whitespace-only values and the literal `"nan"`
/// left over from upstream stringification both collapse to null.
fn normalize_cell(value: &Option<String>) -> Option<String> {
    match value {
        Some(text) if text.trim().is_empty() || text == "nan" => None,
        Some(text) => Some(text.clone()),
        None => None,
    }
}

/// Runs the full pipeline for the `consolidate` subcommand: read and segment
/// the inputs, consolidate, write the output workbook, then validate.
pub fn execute(args: &ConsolidateArgs) -> Result<()> {
    let reference = ReferenceSchema::resolve(args.schema.as_deref())?;
    let (tables, manifest) = workbook::read_and_segment(&args.inputs);
    info!(
        "Extracted {} table(s) from {} input file(s)",
        tables.len(),
        args.inputs.len()
    );

    let (unified, anomaly_report) = consolidate(&tables, &reference);
    emit_report("Anomaly", &anomaly_report, args.anomalies.as_deref())?;

    workbook::write_unified(&args.output, &unified)
        .with_context(|| format!("Writing consolidated workbook to {:?}", args.output))?;
    info!(
        "Wrote {} row(s) across {} column(s) to {:?}",
        unified.rows.len(),
        unified.columns.len(),
        args.output
    );

    if args.skip_validation {
        return Ok(());
    }
    let summary = validate::validation_summary(&unified, &manifest);
    let report = validate::validation_report(&unified, &manifest);
    emit_report("Validation", &report, args.report.as_deref())?;
    if let Some(path) = &args.summary {
        let file = File::create(path)
            .with_context(|| format!("Creating summary file {path:?}"))?;
        serde_json::to_writer_pretty(file, &summary).context("Writing validation summary JSON")?;
        info!("Wrote validation summary to {path:?}");
    }
    if summary.is_valid {
        info!(
            "Validation passed: {} row(s) reconciled across {} table(s)",
            summary.total_consolidated_rows, summary.total_tables
        );
    } else {
        // A failed validation flags the output as untrustworthy but does not
        // un-produce it.
        warn!(
            "Validation failed: {} table(s) mismatched, aggregate difference of {} row(s)",
            summary.validation_errors, summary.difference
        );
    }
    Ok(())
}

fn emit_report(kind: &str, report: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, report)
                .with_context(|| format!("Writing {} report to {path:?}", kind.to_lowercase()))?;
            info!("Wrote {} report to {path:?}", kind.to_lowercase());
        }
        None => info!("{kind} report:\n{report}"),
    }
    Ok(())
}
