//! Workbook writing: one sheet per detected table.
//!
//! The spreadsheet encoding itself belongs to `rust_xlsxwriter`; this module
//! only fixes the contract the rest of the crate relies on — sheet names are
//! `Tabla_<n>` with `n` starting at 1 in detection order, the header row is
//! written first, cells carry plain values and no styling, and there is no
//! index column. The [`WorkbookWriter`] trait keeps that contract mockable
//! for orchestrator tests.

use std::path::Path;

use tracing::debug;

use crate::error::ConvertError;
use crate::extract::DetectedTable;

/// Sheet names are positional: the i-th detected table lands on `Tabla_i`.
pub const SHEET_NAME_PREFIX: &str = "Tabla_";

/// Derive the sheet name for the table at `index` (0-based).
pub fn sheet_name(index: usize) -> String {
    format!("{SHEET_NAME_PREFIX}{}", index + 1)
}

/// A workbook-writing capability: append sheets from 2-D tables and save.
pub trait WorkbookWriter {
    /// Write `tables` to a new workbook at `dest`, one sheet per table.
    fn write(&self, tables: &[DetectedTable], dest: &Path) -> Result<(), ConvertError>;
}

/// The bundled writer, backed by `rust_xlsxwriter`.
#[derive(Debug, Clone, Default)]
pub struct XlsxWriter;

impl WorkbookWriter for XlsxWriter {
    fn write(&self, tables: &[DetectedTable], dest: &Path) -> Result<(), ConvertError> {
        let wrap = |source: rust_xlsxwriter::XlsxError| ConvertError::WorkbookWrite {
            path: dest.to_path_buf(),
            source,
        };

        let mut workbook = rust_xlsxwriter::Workbook::new();

        for (index, table) in tables.iter().enumerate() {
            let sheet = workbook.add_worksheet();
            sheet.set_name(sheet_name(index)).map_err(wrap)?;

            for (col, cell) in table.header.iter().enumerate() {
                write_cell(sheet, 0, col as u16, cell).map_err(wrap)?;
            }
            for (row, cells) in table.rows.iter().enumerate() {
                for (col, cell) in cells.iter().enumerate() {
                    write_cell(sheet, row as u32 + 1, col as u16, cell).map_err(wrap)?;
                }
            }
        }

        workbook.save(dest).map_err(wrap)?;
        debug!(path = %dest.display(), sheets = tables.len(), "workbook saved");
        Ok(())
    }
}

/// Numeric-looking cells become numbers so spreadsheet formulas work on
/// them; everything else is a plain string.
fn write_cell(
    sheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    value: &str,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match value.parse::<f64>() {
        Ok(number) if value.trim() == value && !value.is_empty() => {
            sheet.write_number(row, col, number)?;
        }
        _ => {
            sheet.write_string(row, col, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn table(page: u32, header: &[&str], rows: &[&[&str]]) -> DetectedTable {
        DetectedTable {
            page,
            header: header.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn sheet_names_are_one_indexed() {
        assert_eq!(sheet_name(0), "Tabla_1");
        assert_eq!(sheet_name(6), "Tabla_7");
    }

    #[test]
    fn header_plus_data_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.xlsx");
        let t = table(1, &["Name", "City"], &[&["Alice", "Madrid"], &["Bob", "Sevilla"]]);
        XlsxWriter.write(&[t], &dest).unwrap();

        let mut wb: Xlsx<_> = open_workbook(&dest).unwrap();
        let range = wb.worksheet_range("Tabla_1").unwrap();
        // R data rows + 1 header row, C columns.
        assert_eq!(range.get_size(), (3, 2));
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Name".into())));
        assert_eq!(range.get_value((2, 1)), Some(&Data::String("Sevilla".into())));
    }

    #[test]
    fn every_table_gets_its_own_sheet_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("multi.xlsx");
        let tables = vec![
            table(1, &["a"], &[&["1"]]),
            table(1, &["b"], &[&["2"]]),
            table(2, &["c"], &[&["3"]]),
        ];
        XlsxWriter.write(&tables, &dest).unwrap();

        let wb: Xlsx<_> = open_workbook(&dest).unwrap();
        assert_eq!(
            wb.sheet_names(),
            vec!["Tabla_1".to_string(), "Tabla_2".to_string(), "Tabla_3".to_string()]
        );
    }

    #[test]
    fn numeric_cells_are_written_as_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nums.xlsx");
        let t = table(1, &["qty"], &[&["42"], &["not a number"]]);
        XlsxWriter.write(&[t], &dest).unwrap();

        let mut wb: Xlsx<_> = open_workbook(&dest).unwrap();
        let range = wb.worksheet_range("Tabla_1").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(42.0)));
        assert_eq!(
            range.get_value((2, 0)),
            Some(&Data::String("not a number".into()))
        );
    }
}
