//! Workbook input model handed to the pipeline by the loading layer.
//!
//! Cell values are resolved into [`CellValue`] once, at the loader boundary.
//! Everything downstream matches on the variant instead of inspecting raw
//! spreadsheet data.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single spreadsheet cell value.
///
/// Serialized untagged so a JSON workbook can spell cells as `null`,
/// `"text"` or `3`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Builds a text cell, collapsing the empty string to [`CellValue::Empty`].
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }

    /// True for `Empty` and for text that is blank after trimming.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value of the cell, if it holds a whole number or text that
    /// parses as one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Number(n) => whole_number(*n),
            CellValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
            }
            CellValue::Empty => None,
        }
    }
}

fn whole_number(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    write!(f, "{n:.0}")
                } else {
                    write!(f, "{n}")
                }
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

/// A merged cell block, zero-based and inclusive on both ends.
///
/// `anchor` is the value of the top-left cell as it was read, before any
/// merge was expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRange {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
    #[serde(default)]
    pub anchor: CellValue,
}

impl MergedRange {
    /// Builds a range from two corners in any order; the anchor starts empty.
    pub fn new(r0: usize, c0: usize, r1: usize, c1: usize) -> Self {
        Self {
            first_row: r0.min(r1),
            first_col: c0.min(c1),
            last_row: r0.max(r1),
            last_col: c0.max(c1),
            anchor: CellValue::Empty,
        }
    }

    pub fn with_anchor(mut self, anchor: impl Into<CellValue>) -> Self {
        self.anchor = anchor.into();
        self
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }
}

/// One worksheet: raw rows (possibly ragged) plus merge metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<CellValue>>,
    #[serde(default)]
    pub merged: Vec<MergedRange>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<CellValue>>) -> Self {
        self.rows = rows;
        self
    }

    /// Adds a merged range, snapshotting its anchor from the raw rows.
    pub fn with_merge(mut self, range: MergedRange) -> Self {
        let anchor = self
            .rows
            .get(range.first_row)
            .and_then(|row| row.get(range.first_col))
            .cloned()
            .unwrap_or_default();
        self.merged.push(range.with_anchor(anchor));
        self
    }

    /// Fills empty anchors from the raw rows. Workbooks deserialized from
    /// JSON may list merged ranges without their anchor value.
    pub fn snapshot_anchors(&mut self) {
        for range in self.merged.iter_mut().filter(|m| m.anchor.is_empty()) {
            if let Some(cell) = self
                .rows
                .get(range.first_row.min(range.last_row))
                .and_then(|row| row.get(range.first_col.min(range.last_col)))
            {
                range.anchor = cell.clone();
            }
        }
    }
}

/// A parsed workbook: sheets in workbook order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_from_number_and_text() {
        assert_eq!(CellValue::Number(3.0).as_integer(), Some(3));
        assert_eq!(CellValue::Number(3.5).as_integer(), None);
        assert_eq!(CellValue::text(" 4 ").as_integer(), Some(4));
        assert_eq!(CellValue::text("5.0").as_integer(), Some(5));
        assert_eq!(CellValue::text("slot").as_integer(), None);
        assert_eq!(CellValue::Empty.as_integer(), None);
    }

    #[test]
    fn display_drops_trailing_zero_fraction() {
        assert_eq!(CellValue::Number(12.0).to_string(), "12");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert_eq!(CellValue::text("CS301 2A").to_string(), "CS301 2A");
    }

    #[test]
    fn json_cells_are_untagged() {
        let row: Vec<CellValue> = serde_json::from_str(r#"[null, "MON", 1, ""]"#).unwrap();
        assert_eq!(row[0], CellValue::Empty);
        assert_eq!(row[1], CellValue::Text("MON".into()));
        assert_eq!(row[2], CellValue::Number(1.0));
        assert!(row[3].is_empty());
    }

    #[test]
    fn merge_snapshots_anchor() {
        let sheet = Sheet::new("s")
            .with_rows(vec![vec!["a".into(), CellValue::Empty]])
            .with_merge(MergedRange::new(0, 1, 0, 0));
        assert_eq!(sheet.merged[0].first_col, 0);
        assert_eq!(sheet.merged[0].anchor, CellValue::text("a"));
    }

    #[test]
    fn missing_anchors_filled_from_rows() {
        let mut sheet: Sheet = serde_json::from_str(
            r#"{"name": "s", "rows": [["MON", 1]],
                "merged": [{"first_row": 0, "first_col": 0, "last_row": 1, "last_col": 0},
                           {"first_row": 0, "first_col": 1, "last_row": 0, "last_col": 1, "anchor": "x"}]}"#,
        )
        .unwrap();
        sheet.snapshot_anchors();
        assert_eq!(sheet.merged[0].anchor, CellValue::text("MON"));
        assert_eq!(sheet.merged[1].anchor, CellValue::text("x"));
    }
}
