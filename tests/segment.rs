mod common;

use common::cell;
use sheet_consolidate::segment::{
    PROVENANCE_COLUMNS, SheetGrid, segment_sheet, segment_sheets,
};

fn row(cells: &[&str]) -> Vec<Option<String>> {
    cells
        .iter()
        .map(|text| {
            if text.is_empty() {
                None
            } else {
                cell(text)
            }
        })
        .collect()
}

fn blank(width: usize) -> Vec<Option<String>> {
    vec![None; width]
}

#[test]
fn two_stacked_tables_get_sequential_indices() {
    let grid: SheetGrid = vec![
        row(&["Nome", "Idade"]),
        row(&["Alice", "30"]),
        row(&["Bob", "41"]),
        blank(2),
        row(&["Cidade", "UF"]),
        row(&["Recife", "PE"]),
    ];
    let (tables, manifest) = segment_sheet("dados.xlsx", "Plan1", &grid);

    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].table_index, 1);
    assert_eq!(tables[1].table_index, 2);
    assert_eq!(manifest[0].row_count, 2);
    assert_eq!(manifest[1].row_count, 1);

    // Provenance columns lead, header names follow.
    assert_eq!(tables[0].columns[..3], PROVENANCE_COLUMNS.map(String::from));
    assert_eq!(tables[0].columns[3..], ["Nome".to_string(), "Idade".to_string()]);
    assert_eq!(
        tables[0].rows[0][..3],
        [cell("dados.xlsx"), cell("Plan1"), cell("1")]
    );
    assert_eq!(tables[1].rows[0][2], cell("2"));
}

#[test]
fn table_index_resets_per_sheet() {
    let grid_a: SheetGrid = vec![row(&["A"]), row(&["1"])];
    let grid_b: SheetGrid = vec![row(&["B"]), row(&["2"])];
    let sheets = vec![
        ("Plan1".to_string(), grid_a),
        ("Plan2".to_string(), grid_b),
    ];
    let (tables, manifest) = segment_sheets("dados.xlsx", &sheets);

    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].table_index, 1);
    assert_eq!(tables[1].table_index, 1);
    assert_eq!(manifest[0].sheet, "Plan1");
    assert_eq!(manifest[1].sheet, "Plan2");
}

#[test]
fn entirely_blank_sheet_yields_nothing() {
    let grid: SheetGrid = vec![blank(3), blank(3), blank(3)];
    let (tables, manifest) = segment_sheet("dados.xlsx", "Plan1", &grid);
    assert!(tables.is_empty());
    assert!(manifest.is_empty());
}

#[test]
fn empty_grid_yields_nothing() {
    let (tables, manifest) = segment_sheet("dados.xlsx", "Plan1", &Vec::new());
    assert!(tables.is_empty());
    assert!(manifest.is_empty());
}

#[test]
fn header_only_table_is_discarded_without_consuming_an_index() {
    let grid: SheetGrid = vec![
        row(&["Solta"]),
        blank(1),
        row(&["Nome"]),
        row(&["Alice"]),
    ];
    let (tables, manifest) = segment_sheet("dados.xlsx", "Plan1", &grid);

    // The header-only slice is dropped; the surviving table is Tabela 1.
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].table_index, 1);
    assert_eq!(tables[0].columns[3], "Nome");
    assert_eq!(manifest, vec![sheet_consolidate::segment::ManifestEntry {
        file: "dados.xlsx".to_string(),
        sheet: "Plan1".to_string(),
        table_index: 1,
        row_count: 1,
    }]);
}

#[test]
fn blank_header_cells_synthesize_positional_names() {
    let grid: SheetGrid = vec![
        row(&["Nome", "", "Email"]),
        row(&["Alice", "30", "a@x.com"]),
    ];
    let (tables, _) = segment_sheet("dados.xlsx", "Plan1", &grid);
    assert_eq!(
        tables[0].columns[3..],
        [
            "Nome".to_string(),
            "Column_1".to_string(),
            "Email".to_string()
        ]
    );
}

#[test]
fn interior_blank_cells_do_not_split_a_table() {
    let grid: SheetGrid = vec![
        row(&["Nome", "Idade"]),
        row(&["Alice", ""]),
        row(&["", "41"]),
    ];
    let (tables, manifest) = segment_sheet("dados.xlsx", "Plan1", &grid);
    assert_eq!(tables.len(), 1);
    assert_eq!(manifest[0].row_count, 2);
    assert_eq!(tables[0].rows[0][4], None);
    assert_eq!(tables[0].rows[1][3], None);
}

#[test]
fn consecutive_blank_rows_separate_the_same_tables() {
    let grid: SheetGrid = vec![
        row(&["A"]),
        row(&["1"]),
        blank(1),
        blank(1),
        row(&["B"]),
        row(&["2"]),
    ];
    let (tables, _) = segment_sheet("dados.xlsx", "Plan1", &grid);
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[1].columns[3], "B");
}

#[test]
fn every_row_covers_every_column() {
    let grid: SheetGrid = vec![
        row(&["Nome", "Idade", "Email"]),
        row(&["Alice"]),
        row(&["Bob", "41", "b@x.com"]),
    ];
    let (tables, _) = segment_sheet("dados.xlsx", "Plan1", &grid);
    let table = &tables[0];
    for data_row in &table.rows {
        assert_eq!(data_row.len(), table.columns.len());
    }
    assert_eq!(table.rows[0][4], None);
}
