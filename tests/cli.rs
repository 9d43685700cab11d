mod common;

use std::fs;

use assert_cmd::Command;
use calamine::{Data, Reader, open_workbook_auto};
use common::TestWorkspace;
use predicates::str::contains;

fn survey_fixture(workspace: &TestWorkspace) -> std::path::PathBuf {
    workspace.write_workbook(
        "survey.xlsx",
        &[(
            "Plan1",
            vec![
                vec![Some("P1"), Some("P2"), Some("P10")],
                vec![Some("a"), Some("b"), Some("c")],
                vec![Some("d"), Some("e"), Some("f")],
                vec![None, None, None],
                vec![Some("P1"), Some("Nova_A")],
                vec![Some("x"), Some("y")],
            ],
        )],
    )
}

#[test]
fn consolidate_writes_workbook_and_reports() {
    let workspace = TestWorkspace::new();
    let input = survey_fixture(&workspace);
    let output = workspace.path().join("consolidated.xlsx");
    let anomalies = workspace.path().join("anomalies.txt");
    let report = workspace.path().join("validation.txt");
    let summary = workspace.path().join("summary.json");

    Command::cargo_bin("sheet-consolidate")
        .expect("binary exists")
        .args([
            "consolidate",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--anomalies",
            anomalies.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
            "--summary",
            summary.to_str().unwrap(),
        ])
        .assert()
        .success();

    let mut workbook = open_workbook_auto(&output).expect("open output");
    let range = workbook
        .worksheet_range("Consolidated_Data")
        .expect("consolidated sheet");
    let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();

    // Header row plus two rows from the first table and one from the second.
    assert_eq!(rows.len(), 4);
    let header: Vec<String> = rows[0].iter().map(|cell| cell.to_string()).collect();
    assert_eq!(
        header,
        vec![
            "Nome do Arquivo de Origem",
            "Nome da Planilha de Origem",
            "Índice da Tabela na Planilha",
            "P1",
            "P2",
            "P10",
            "Nova_A",
        ]
    );
    assert_eq!(rows[1][0].to_string(), "survey.xlsx");
    assert_eq!(rows[1][2].to_string(), "1");
    assert_eq!(rows[3][2].to_string(), "2");

    let anomaly_text = fs::read_to_string(&anomalies).expect("read anomalies");
    let lines: Vec<&str> = anomaly_text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "survey.xlsx -> Plan1 -> Tabela 1: ['Nova_A']",
            "survey.xlsx -> Plan1 -> Tabela 2: ['P10', 'P2']",
        ]
    );

    let report_text = fs::read_to_string(&report).expect("read report");
    assert!(report_text.contains("RESULTADO: SUCESSO"));

    let summary_text = fs::read_to_string(&summary).expect("read summary");
    let summary_json: serde_json::Value =
        serde_json::from_str(&summary_text).expect("parse summary");
    assert_eq!(summary_json["is_valid"], true);
    assert_eq!(summary_json["total_source_rows"], 3);
    assert_eq!(summary_json["total_tables"], 2);
}

#[test]
fn consolidate_skips_unreadable_inputs() {
    let workspace = TestWorkspace::new();
    let good = survey_fixture(&workspace);
    let broken = workspace.path().join("broken.xlsx");
    fs::write(&broken, b"not a workbook").expect("write broken file");
    let output = workspace.path().join("consolidated.xlsx");

    Command::cargo_bin("sheet-consolidate")
        .expect("binary exists")
        .args([
            "consolidate",
            "-i",
            broken.to_str().unwrap(),
            "-i",
            good.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let mut workbook = open_workbook_auto(&output).expect("open output");
    let range = workbook
        .worksheet_range("Consolidated_Data")
        .expect("consolidated sheet");
    assert_eq!(range.rows().count(), 4);
}

#[test]
fn consolidate_with_no_usable_input_still_produces_a_workbook() {
    let workspace = TestWorkspace::new();
    let empty = workspace.write_workbook("empty.xlsx", &[("Plan1", vec![])]);
    let output = workspace.path().join("consolidated.xlsx");

    Command::cargo_bin("sheet-consolidate")
        .expect("binary exists")
        .args([
            "consolidate",
            "-i",
            empty.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--skip-validation",
        ])
        .assert()
        .success();

    let mut workbook = open_workbook_auto(&output).expect("open output");
    let range = workbook
        .worksheet_range("Consolidated_Data")
        .expect("consolidated sheet");
    assert_eq!(range.rows().count(), 0);
}

#[test]
fn tables_lists_segmented_tables() {
    let workspace = TestWorkspace::new();
    let input = survey_fixture(&workspace);

    Command::cargo_bin("sheet-consolidate")
        .expect("binary exists")
        .args(["tables", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("survey.xlsx"))
        .stdout(contains("Plan1"));
}

#[test]
fn columns_classifies_the_planned_order() {
    let workspace = TestWorkspace::new();
    let input = survey_fixture(&workspace);

    Command::cargo_bin("sheet-consolidate")
        .expect("binary exists")
        .args(["columns", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("provenance"))
        .stdout(contains("question"))
        .stdout(contains("unexpected"));
}

#[test]
fn columns_accepts_a_custom_schema() {
    let workspace = TestWorkspace::new();
    let input = survey_fixture(&workspace);
    let schema = workspace.path().join("schema.json");
    fs::write(
        &schema,
        r#"{"version": "custom", "columns": ["Nova_A", "P1"]}"#,
    )
    .expect("write schema");

    Command::cargo_bin("sheet-consolidate")
        .expect("binary exists")
        .args([
            "columns",
            "-i",
            input.to_str().unwrap(),
            "-s",
            schema.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Nova_A"));
}
