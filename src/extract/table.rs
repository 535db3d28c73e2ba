//! The detected-table model and the cell-splitting helpers shared by both
//! detection modes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One table found in a PDF.
///
/// The first detected row becomes the header; the remaining rows are data.
/// Tables carry no identity beyond the page they came from and their position
/// in detection order — the workbook writer derives `Tabla_<n>` names from
/// that position alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedTable {
    /// 1-indexed page number the table was found on.
    pub page: u32,
    /// Header row, exactly `column_count()` cells wide.
    pub header: Vec<String>,
    /// Data rows, each exactly `column_count()` cells wide.
    pub rows: Vec<Vec<String>>,
}

impl DetectedTable {
    /// Build a table from a run of raw rows, taking the first row as header.
    ///
    /// Rows are normalized to `width` cells: short rows are padded with empty
    /// cells, overlong rows fold their tail into the last cell so no text is
    /// dropped. Returns `None` for runs of fewer than two rows — a lone line
    /// is not a table.
    pub(crate) fn from_rows(page: u32, raw: Vec<Vec<String>>, width: usize) -> Option<Self> {
        if raw.len() < 2 || width == 0 {
            return None;
        }

        let mut rows = raw.into_iter().map(|r| fit_row(r, width));
        let header = rows.next()?;
        Some(DetectedTable {
            page,
            header,
            rows: rows.collect(),
        })
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Force a row to exactly `width` cells.
fn fit_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    if row.len() > width {
        let tail = row.split_off(width);
        let last = row.last_mut().expect("width > 0");
        for cell in tail {
            if !last.is_empty() && !cell.is_empty() {
                last.push(' ');
            }
            last.push_str(&cell);
        }
    }
    row.resize(width, String::new());
    row
}

/// Split a line into cells on tab stops and runs of two or more spaces.
///
/// Single spaces stay inside a cell so "Total amount  1 200,50" yields two
/// cells, not four.
pub(crate) fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    for tab_part in line.trim().split('\t') {
        let mut rest = tab_part.trim();
        while !rest.is_empty() {
            match rest.find("  ") {
                Some(pos) => {
                    let (cell, tail) = rest.split_at(pos);
                    if !cell.trim().is_empty() {
                        cells.push(cell.trim().to_string());
                    }
                    rest = tail.trim_start();
                }
                None => {
                    cells.push(rest.to_string());
                    break;
                }
            }
        }
    }
    cells
}

/// Split on every whitespace gap. Used as a rescue when the hard split finds
/// too few cells but the line still looks tabular.
pub(crate) fn soft_split_cells(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// The most common row width in a run; ties break toward the wider value.
pub(crate) fn modal_width(rows: &[Vec<String>]) -> usize {
    let mut freq: HashMap<usize, usize> = HashMap::new();
    for row in rows {
        *freq.entry(row.len()).or_insert(0) += 1;
    }
    freq.into_iter()
        .max_by_key(|(width, count)| (*count, *width))
        .map_or(0, |(width, _)| width)
}
