#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes an `.xlsx` workbook under the workspace and returns its path.
    /// Each sheet is a grid of optional string cells; `None` cells are left
    /// unwritten so fully blank rows act as table separators.
    pub fn write_workbook(
        &self,
        name: &str,
        sheets: &[(&str, Vec<Vec<Option<&str>>>)],
    ) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut workbook = Workbook::new();
        for (sheet_name, grid) in sheets {
            let sheet = workbook.add_worksheet();
            sheet.set_name(*sheet_name).expect("sheet name");
            for (row_idx, row) in grid.iter().enumerate() {
                for (col_idx, cell) in row.iter().enumerate() {
                    if let Some(text) = cell {
                        sheet
                            .write_string(row_idx as u32, col_idx as u16, *text)
                            .expect("write cell");
                    }
                }
            }
        }
        workbook.save(&path).expect("save workbook");
        path
    }
}

/// Shorthand for an owned optional cell.
pub fn cell(text: &str) -> Option<String> {
    Some(text.to_string())
}
