//! Post-consolidation integrity validation.
//!
//! The validator proves no rows were lost: it reconciles the unified table's
//! row counts, partitioned by the three provenance columns, against the
//! manifest captured at segmentation time. It is read-only and never fails;
//! a mismatch is reported, not raised, so the operator can decide whether to
//! trust the output.

use std::fmt::Write as _;

use serde::Serialize;

use crate::{
    consolidate::UnifiedTable,
    segment::{ManifestEntry, SOURCE_FILE_COLUMN, SOURCE_SHEET_COLUMN, TABLE_INDEX_COLUMN},
};

/// Machine-readable validation outcome. `is_valid` requires the aggregate
/// totals to match AND zero per-table mismatches; compensating per-table
/// errors cannot hide behind an accidentally matching total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub is_valid: bool,
    pub total_source_rows: usize,
    pub total_consolidated_rows: usize,
    pub difference: usize,
    pub total_tables: usize,
    pub validation_errors: usize,
    pub totals_match: bool,
}

struct TableCheck<'a> {
    entry: &'a ManifestEntry,
    actual: usize,
}

impl TableCheck<'_> {
    fn matches(&self) -> bool {
        self.actual == self.entry.row_count
    }
}

fn run_checks<'a>(table: &UnifiedTable, manifest: &'a [ManifestEntry]) -> Vec<TableCheck<'a>> {
    let indices = (
        table.column_index(SOURCE_FILE_COLUMN),
        table.column_index(SOURCE_SHEET_COLUMN),
        table.column_index(TABLE_INDEX_COLUMN),
    );
    manifest
        .iter()
        .map(|entry| {
            let actual = match indices {
                (Some(file), Some(sheet), Some(index)) => table
                    .rows
                    .iter()
                    .filter(|row| row_matches(row.as_slice(), entry, file, sheet, index))
                    .count(),
                // Without provenance columns nothing can be attributed.
                _ => 0,
            };
            TableCheck { entry, actual }
        })
        .collect()
}

fn row_matches(
    row: &[Option<String>],
    entry: &ManifestEntry,
    file_idx: usize,
    sheet_idx: usize,
    index_idx: usize,
) -> bool {
    let text = |idx: usize| row.get(idx).and_then(|cell| cell.as_deref());
    // The table index round-trips through text storage, so compare as integer.
    let table_index = text(index_idx).and_then(|value| value.trim().parse::<usize>().ok());
    text(file_idx) == Some(entry.file.as_str())
        && text(sheet_idx) == Some(entry.sheet.as_str())
        && table_index == Some(entry.table_index)
}

/// Produces the structured validation outcome. Idempotent and side-effect
/// free: repeated calls on the same inputs yield identical results.
pub fn validation_summary(table: &UnifiedTable, manifest: &[ManifestEntry]) -> ValidationSummary {
    let checks = run_checks(table, manifest);
    let total_source_rows: usize = manifest.iter().map(|entry| entry.row_count).sum();
    let total_consolidated_rows = table.rows.len();
    let totals_match = total_source_rows == total_consolidated_rows;
    let validation_errors = checks.iter().filter(|check| !check.matches()).count();
    ValidationSummary {
        is_valid: totals_match && validation_errors == 0,
        total_source_rows,
        total_consolidated_rows,
        difference: total_source_rows.abs_diff(total_consolidated_rows),
        total_tables: manifest.len(),
        validation_errors,
        totals_match,
    }
}

/// Renders the detailed, human-readable validation report.
pub fn validation_report(table: &UnifiedTable, manifest: &[ManifestEntry]) -> String {
    let checks = run_checks(table, manifest);
    let summary = validation_summary(table, manifest);
    let rule = "=".repeat(60);
    let thin_rule = "-".repeat(60);

    let mut report = String::new();
    let _ = writeln!(report, "{rule}");
    let _ = writeln!(report, "RELATÓRIO DE VALIDAÇÃO DE INTEGRIDADE");
    let _ = writeln!(report, "{rule}");
    if summary.is_valid {
        let _ = writeln!(report, "RESULTADO: SUCESSO - Integridade validada com sucesso!");
    } else {
        let _ = writeln!(
            report,
            "RESULTADO: FALHA - Discrepância encontrada na consolidação!"
        );
    }
    let _ = writeln!(report);
    let _ = writeln!(report, "CONTAGENS TOTAIS:");
    let _ = writeln!(
        report,
        "   - Linhas nas tabelas de origem: {}",
        summary.total_source_rows
    );
    let _ = writeln!(
        report,
        "   - Linhas no arquivo consolidado: {}",
        summary.total_consolidated_rows
    );
    let _ = writeln!(report, "   - Diferença: {}", summary.difference);
    let _ = writeln!(report);
    let _ = writeln!(report, "VALIDAÇÃO DETALHADA POR TABELA:");
    let _ = writeln!(report, "{thin_rule}");
    for check in &checks {
        let status = if check.matches() { "OK  " } else { "ERRO" };
        let _ = writeln!(
            report,
            "{status} {} -> {} -> Tabela {}: {}/{} linhas",
            check.entry.file,
            check.entry.sheet,
            check.entry.table_index,
            check.actual,
            check.entry.row_count
        );
    }

    let failures: Vec<&TableCheck> = checks.iter().filter(|check| !check.matches()).collect();
    if !failures.is_empty() {
        let _ = writeln!(report);
        let _ = writeln!(report, "DETALHES DOS ERROS ENCONTRADOS:");
        let _ = writeln!(report, "{thin_rule}");
        for check in failures {
            let _ = writeln!(
                report,
                "{} -> {} -> Tabela {}: esperado {} linha(s), encontrado {}, diferença {}",
                check.entry.file,
                check.entry.sheet,
                check.entry.table_index,
                check.entry.row_count,
                check.actual,
                check.entry.row_count.abs_diff(check.actual)
            );
        }
    }

    let _ = writeln!(report, "{rule}");
    if summary.is_valid {
        let _ = writeln!(report, "VALIDAÇÃO CONCLUÍDA: todos os dados foram preservados.");
    } else {
        let _ = writeln!(report, "ATENÇÃO: foram encontradas discrepâncias!");
        if !summary.totals_match {
            let _ = writeln!(report, "   - Totais de linhas não coincidem.");
        }
        if summary.validation_errors > 0 {
            let _ = writeln!(
                report,
                "   - {} tabela(s) com contagem incorreta.",
                summary.validation_errors
            );
        }
    }
    let _ = writeln!(report, "{rule}");
    report
}
