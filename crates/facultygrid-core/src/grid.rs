//! Grid normalization: merged-cell expansion and header detection.

use crate::cell::{CellValue, MergedRange, Sheet};

/// Column holding the day token.
pub const DAY_COLUMN: usize = 0;
/// Column holding the time-slot number.
pub const TIME_SLOT_COLUMN: usize = 1;
/// First column that may name a faculty member or a joint-session marker.
pub const FIRST_FACULTY_COLUMN: usize = 2;

/// A rectangular sheet with a located header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    /// Column names taken from the header row.
    pub columns: Vec<CellValue>,
    /// Rows after the header row, each exactly `columns.len()` wide.
    pub rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

/// Largest sheet a merged range may reach (the `.xlsx` row and column limits).
pub const MAX_ROWS: usize = 1_048_576;
pub const MAX_COLS: usize = 16_384;

/// Merged ranges with their corners in order. Ranges reaching past the sheet
/// limits are dropped.
fn usable_ranges(merged: &[MergedRange]) -> Vec<MergedRange> {
    merged
        .iter()
        .filter_map(|m| {
            let range = MergedRange::new(m.first_row, m.first_col, m.last_row, m.last_col)
                .with_anchor(m.anchor.clone());
            if range.last_row >= MAX_ROWS || range.last_col >= MAX_COLS {
                log::warn!(
                    "merged range rows {}..={} cols {}..={} lies outside the sheet; ignored",
                    range.first_row,
                    range.last_row,
                    range.first_col,
                    range.last_col
                );
                return None;
            }
            Some(range)
        })
        .collect()
}

/// Pads ragged rows and grows the grid so every merged range fits, then
/// copies each range's anchor value over the whole range.
///
/// Ranges are applied in order, so a later overlapping range overwrites an
/// earlier one.
pub fn expand_merged(rows: &[Vec<CellValue>], merged: &[MergedRange]) -> Vec<Vec<CellValue>> {
    let merged = usable_ranges(merged);
    let height = merged
        .iter()
        .map(|m| m.last_row + 1)
        .chain(std::iter::once(rows.len()))
        .max()
        .unwrap_or(0);
    let width = merged
        .iter()
        .map(|m| m.last_col + 1)
        .chain(rows.iter().map(Vec::len))
        .max()
        .unwrap_or(0);

    let mut grid: Vec<Vec<CellValue>> = (0..height)
        .map(|r| {
            let mut row = rows.get(r).cloned().unwrap_or_default();
            row.resize(width, CellValue::Empty);
            row
        })
        .collect();

    for m in &merged {
        for row in &mut grid[m.first_row..=m.last_row] {
            for cell in &mut row[m.first_col..=m.last_col] {
                *cell = m.anchor.clone();
            }
        }
    }
    grid
}

/// Index of the first row holding any non-empty cell.
pub fn find_header_row(rows: &[Vec<CellValue>]) -> Option<usize> {
    rows.iter()
        .position(|row| row.iter().any(|cell| !cell.is_empty()))
}

/// Normalizes one sheet into a [`Grid`].
///
/// A sheet with no non-empty cell normalizes to an empty grid.
pub fn normalize(sheet: &Sheet) -> Grid {
    let mut expanded = expand_merged(&sheet.rows, &sheet.merged);
    let Some(header) = find_header_row(&expanded) else {
        log::warn!("sheet `{}` has no content; skipping", sheet.name);
        return Grid::default();
    };
    let rows = expanded.split_off(header + 1);
    let columns = expanded.pop().unwrap_or_default();
    log::debug!(
        "sheet `{}`: header at row {}, {} data rows, {} columns",
        sheet.name,
        header,
        rows.len(),
        columns.len()
    );
    Grid { columns, rows }
}
