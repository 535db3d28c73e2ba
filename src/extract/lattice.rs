//! Lattice mode: tables delimited by drawn ruling lines.
//!
//! A ruled table leaves a recognisable footprint in the page geometry: a
//! stack of horizontal rulings crossed by a set of vertical ones. The grid
//! fixes the table's shape — the vertical rulings give the column count, the
//! horizontal ones bound the row count — while the cell text itself is carved
//! from the page's text layer, which carries no coordinates. Pages without a
//! ruling grid contribute nothing in this mode, which is what pushes
//! scanned or unruled documents into the stream-mode retry.

use tracing::debug;

use crate::extract::reader::{PageContent, Ruling};
use crate::extract::table::{split_cells, soft_split_cells, DetectedTable};

/// Rulings whose fixed coordinate differs by less than this belong to the
/// same grid line.
const CLUSTER_TOLERANCE: f64 = 2.0;

/// A gap this much larger than the typical row height starts a new grid.
const GRID_SPLIT_FACTOR: f64 = 3.0;

/// Detect ruled tables on every page, in page order.
pub(crate) fn detect(pages: &[PageContent], min_cols: usize) -> Vec<DetectedTable> {
    let mut tables = Vec::new();

    for page in pages {
        let grids = find_grids(page);
        if grids.is_empty() {
            continue;
        }
        debug!(page = page.number, grids = grids.len(), "ruling grids found");

        let mut runs = cell_line_runs(&page.text, min_cols).into_iter();
        for grid in grids {
            let Some(run) = runs.next() else { break };
            if let Some(table) = DetectedTable::from_rows(page.number, run, grid.columns) {
                tables.push(table);
            }
        }
    }

    tables
}

/// A detected ruling grid: enough structure to fix the table shape.
#[derive(Debug, PartialEq)]
struct Grid {
    columns: usize,
}

/// Cluster the page's rulings into grids.
///
/// Horizontal positions are clustered first; a run of row lines separated by
/// roughly even gaps forms one grid band, and an outsized gap starts the next
/// band (two stacked tables on one page). Each band then needs at least two
/// vertical rulings crossing it to count as a grid.
fn find_grids(page: &PageContent) -> Vec<Grid> {
    let mut row_lines = cluster_positions(&page.horizontal);
    if row_lines.len() < 2 {
        return Vec::new();
    }
    // Page space grows upward; visual top-to-bottom order is descending y.
    row_lines.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut bands: Vec<(f64, f64)> = Vec::new(); // (top_y, bottom_y)
    let gaps: Vec<f64> = row_lines.windows(2).map(|w| w[0] - w[1]).collect();
    let typical_gap = median(&gaps);

    let mut band_top = row_lines[0];
    let mut band_bottom = row_lines[0];
    let mut band_lines = 1usize;
    for (i, &y) in row_lines.iter().enumerate().skip(1) {
        let gap = row_lines[i - 1] - y;
        if typical_gap > 0.0 && gap > GRID_SPLIT_FACTOR * typical_gap {
            if band_lines >= 2 {
                bands.push((band_top, band_bottom));
            }
            band_top = y;
            band_lines = 0;
        }
        band_bottom = y;
        band_lines += 1;
    }
    if band_lines >= 2 {
        bands.push((band_top, band_bottom));
    }

    bands
        .into_iter()
        .filter_map(|(top, bottom)| {
            let crossing: Vec<Ruling> = page
                .vertical
                .iter()
                .filter(|v| v.start <= bottom + CLUSTER_TOLERANCE && v.end >= top - CLUSTER_TOLERANCE)
                .copied()
                .collect();
            let col_lines = cluster_positions(&crossing);
            if col_lines.len() < 2 {
                return None;
            }
            Some(Grid {
                columns: col_lines.len() - 1,
            })
        })
        .collect()
}

/// Collapse rulings into distinct grid-line positions.
fn cluster_positions(rulings: &[Ruling]) -> Vec<f64> {
    let mut positions: Vec<f64> = rulings.iter().map(|r| r.pos).collect();
    positions.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut clustered: Vec<f64> = Vec::new();
    for pos in positions {
        match clustered.last() {
            Some(last) if (pos - last).abs() <= CLUSTER_TOLERANCE => {}
            _ => clustered.push(pos),
        }
    }
    clustered
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted[sorted.len() / 2]
}

/// Group the page's text lines into consecutive runs of cell-bearing lines.
///
/// Lattice tables often render with the same wide gaps stream tables do, so
/// the same splitters apply; a line that hard-splits below `min_cols` gets
/// one soft-split attempt before breaking the run.
pub(crate) fn cell_line_runs(text: &str, min_cols: usize) -> Vec<Vec<Vec<String>>> {
    let mut runs = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        let mut cells = split_cells(line);
        if cells.len() < min_cols {
            let soft = soft_split_cells(line);
            if soft.len() >= min_cols && !looks_like_sentence(line) {
                cells = soft;
            }
        }

        if cells.len() >= min_cols {
            current.push(cells);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn looks_like_sentence(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.ends_with('.') || trimmed.ends_with('!') || trimmed.ends_with('?')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::reader::Ruling;

    fn h(pos: f64, start: f64, end: f64) -> Ruling {
        Ruling { pos, start, end }
    }

    fn page_with(horizontal: Vec<Ruling>, vertical: Vec<Ruling>, text: &str) -> PageContent {
        PageContent {
            number: 1,
            text: text.to_string(),
            horizontal,
            vertical,
        }
    }

    fn grid_page(text: &str) -> PageContent {
        // Three row lines at y = 700/680/660, three column lines spanning them.
        let horizontal = vec![
            h(700.0, 100.0, 300.0),
            h(680.0, 100.0, 300.0),
            h(660.0, 100.0, 300.0),
        ];
        let vertical = vec![
            h(100.0, 660.0, 700.0),
            h(200.0, 660.0, 700.0),
            h(300.0, 660.0, 700.0),
        ];
        page_with(horizontal, vertical, text)
    }

    #[test]
    fn grid_fixes_column_count_from_vertical_rulings() {
        let page = grid_page("Name  Age\nAlice  30\nBob  41");
        let tables = detect(&[page], 2);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].column_count(), 2);
        assert_eq!(tables[0].row_count(), 2);
    }

    #[test]
    fn page_without_rulings_yields_nothing() {
        let page = page_with(Vec::new(), Vec::new(), "Name  Age\nAlice  30");
        assert!(detect(&[page], 2).is_empty());
    }

    #[test]
    fn vertical_rulings_must_cross_the_band() {
        // Verticals live far below the horizontal band, so no grid forms.
        let horizontal = vec![h(700.0, 100.0, 300.0), h(680.0, 100.0, 300.0)];
        let vertical = vec![h(100.0, 10.0, 50.0), h(200.0, 10.0, 50.0)];
        let page = page_with(horizontal, vertical, "a  b\nc  d");
        assert!(detect(&[page], 2).is_empty());
    }

    #[test]
    fn an_outsized_gap_splits_two_grids() {
        let horizontal = vec![
            h(700.0, 0.0, 300.0),
            h(680.0, 0.0, 300.0),
            h(660.0, 0.0, 300.0),
            // 400pt gap, then a second table.
            h(260.0, 0.0, 300.0),
            h(240.0, 0.0, 300.0),
        ];
        let vertical = vec![
            h(0.0, 660.0, 700.0),
            h(150.0, 660.0, 700.0),
            h(300.0, 660.0, 700.0),
            h(0.0, 240.0, 260.0),
            h(300.0, 240.0, 260.0),
        ];
        let text = "h1  h2\na  b\n\nsolo prose line.\n\nx  y\n1  2";
        let page = page_with(horizontal, vertical, text);
        let tables = detect(&[page], 2);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].column_count(), 2);
        assert_eq!(tables[1].column_count(), 1);
    }

    #[test]
    fn runs_break_on_prose_lines() {
        let runs = cell_line_runs("a  b\nc  d\nThis is a sentence.\nx  y\nz  w", 2);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[1].len(), 2);
    }

    #[test]
    fn cluster_merges_near_duplicate_positions() {
        let rulings = vec![h(100.0, 0.0, 10.0), h(101.0, 0.0, 10.0), h(200.0, 0.0, 10.0)];
        assert_eq!(cluster_positions(&rulings), vec![100.0, 200.0]);
    }
}
