//! Raw grid access helpers.
//!
//! Rows are ragged: a row may stop before the last populated column of the
//! sheet, so every lookup goes through [`cell`], which treats a missing cell
//! as empty.

use parstock_core::thresholds::{HEADER_SCAN_ROWS, MAX_SCANNED_COLUMNS};

/// One row of text cells.
pub type Row = Vec<String>;

/// Row-major grid of text cells as delivered by the sheet export.
pub type RawGrid = Vec<Row>;

/// Trimmed cell text, or `""` when the row is too short.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|c| c.trim()).unwrap_or("")
}

/// A row with no cells or only blank cells.
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Index of the header row: the row with the most cells among the first
/// `HEADER_SCAN_ROWS` rows. Ties keep the earliest row.
pub fn find_header_row(grid: &[Row]) -> usize {
    let mut best = 0;
    let mut best_len = grid.first().map(|r| r.len()).unwrap_or(0);
    for (i, row) in grid.iter().enumerate().take(HEADER_SCAN_ROWS).skip(1) {
        if row.len() > best_len {
            best = i;
            best_len = row.len();
        }
    }
    best
}

/// Widest row in the grid, capped at `MAX_SCANNED_COLUMNS`.
pub fn grid_width(grid: &[Row]) -> usize {
    grid.iter()
        .map(|r| r.len())
        .max()
        .unwrap_or(0)
        .min(MAX_SCANNED_COLUMNS)
}

/// Collapse runs of whitespace (including embedded newlines) to one space.
pub fn normalize_header(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
