//! Stream mode: tables inferred from whitespace alignment.
//!
//! No geometry is consulted here. A table is a run of two or more
//! consecutive text lines that each split into enough cells on wide gaps;
//! the run's modal width decides the column count and ragged rows are
//! normalized to it. This is the retry mode — it fires only when lattice
//! mode came back empty — so it leans permissive rather than precise.

use crate::extract::reader::PageContent;
use crate::extract::table::{modal_width, split_cells, soft_split_cells, DetectedTable};

/// Detect whitespace-aligned tables on every page, in page order.
pub(crate) fn detect(pages: &[PageContent], min_cols: usize) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    for page in pages {
        detect_in_page(page, min_cols, &mut tables);
    }
    tables
}

fn detect_in_page(page: &PageContent, min_cols: usize, tables: &mut Vec<DetectedTable>) {
    let mut current: Vec<Vec<String>> = Vec::new();

    for line in page.text.lines() {
        match row_cells(line, min_cols) {
            Some(cells) => current.push(cells),
            None => flush(page.number, &mut current, tables),
        }
    }
    flush(page.number, &mut current, tables);
}

fn flush(page: u32, current: &mut Vec<Vec<String>>, tables: &mut Vec<DetectedTable>) {
    let run = std::mem::take(current);
    let width = modal_width(&run);
    if let Some(table) = DetectedTable::from_rows(page, run, width) {
        tables.push(table);
    }
}

/// Split a line into table cells, or `None` when the line reads as prose.
///
/// The hard split (tabs, 2+ spaces) is authoritative. The single-space soft
/// split is only trusted for lines that look like data: not
/// sentence-punctuated, and either carrying a digit or short enough that
/// every word being a cell is plausible.
fn row_cells(line: &str, min_cols: usize) -> Option<Vec<String>> {
    let cells = split_cells(line);
    if cells.len() >= min_cols {
        return Some(cells);
    }

    let soft = soft_split_cells(line);
    if soft.len() < min_cols {
        return None;
    }
    let trimmed = line.trim_end();
    let sentence_like =
        trimmed.ends_with('.') || trimmed.ends_with('!') || trimmed.ends_with('?');
    let has_digit = soft.iter().any(|c| c.chars().any(|ch| ch.is_ascii_digit()));
    if !sentence_like && (has_digit || soft.len() <= 6) {
        Some(soft)
    } else {
        None
    }
}
