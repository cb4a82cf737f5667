//! Per-faculty schedule extraction.
//!
//! Each faculty column of a normalized [`Grid`] is walked top to bottom. A
//! cell whose neighbour above or below holds the same value is one half of a
//! two-slot lab; only the first half is emitted. Joint-session columns carry
//! `"<subject> (<faculty>)"` values and are attributed to the named faculty.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::cell::{CellValue, Workbook};
use crate::config::PipelineConfig;
use crate::day::Weekday;
use crate::grid::{self, Grid, DAY_COLUMN, FIRST_FACULTY_COLUMN, TIME_SLOT_COLUMN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionType {
    Lecture,
    Lab,
}

/// One teaching slot as it appears in a faculty column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub subject: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub time_slot: i64,
}

/// A faculty member's week: every weekday present, entries in sheet order.
pub type WeekSchedule = BTreeMap<Weekday, Vec<ScheduleEntry>>;

fn empty_week() -> WeekSchedule {
    Weekday::ALL.iter().map(|day| (*day, Vec::new())).collect()
}

/// Faculty name to weekly schedule, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacultySchedule {
    faculty: IndexMap<String, WeekSchedule>,
}

impl FacultySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.faculty.is_empty()
    }

    pub fn len(&self) -> usize {
        self.faculty.len()
    }

    pub fn get(&self, faculty: &str) -> Option<&WeekSchedule> {
        self.faculty.get(faculty)
    }

    /// Entries for one faculty on one day; empty if either is unknown.
    pub fn day(&self, faculty: &str, day: Weekday) -> &[ScheduleEntry] {
        self.faculty
            .get(faculty)
            .and_then(|week| week.get(&day))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WeekSchedule)> {
        self.faculty.iter().map(|(name, week)| (name.as_str(), week))
    }

    /// Every `(faculty, day, entry)` triple in schedule order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Weekday, &ScheduleEntry)> {
        self.iter().flat_map(|(name, week)| {
            week.iter()
                .flat_map(move |(day, entries)| entries.iter().map(move |e| (name, *day, e)))
        })
    }

    /// Registers a faculty member with an empty week if not yet present.
    pub fn ensure_faculty(&mut self, faculty: &str) -> &mut WeekSchedule {
        self.faculty
            .entry(faculty.to_string())
            .or_insert_with(empty_week)
    }

    pub fn push(&mut self, faculty: &str, day: Weekday, entry: ScheduleEntry) {
        self.ensure_faculty(faculty)
            .entry(day)
            .or_default()
            .push(entry);
    }

    /// Concatenates `other` into `self`, day by day. Entries are not
    /// deduplicated.
    pub fn merge(&mut self, other: FacultySchedule) {
        for (name, week) in other.faculty {
            let target = self.ensure_faculty(&name);
            for (day, entries) in week {
                target.entry(day).or_default().extend(entries);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnKind {
    Faculty(String),
    JointSession,
}

fn classify_column(header: &CellValue, config: &PipelineConfig) -> Option<ColumnKind> {
    let name = header.to_string();
    let name = name.trim();
    if name.is_empty() || name.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if config.is_joint_session_column(name) {
        Some(ColumnKind::JointSession)
    } else {
        Some(ColumnKind::Faculty(name.to_string()))
    }
}

/// Identifies one lab pair: the row of its first half, per faculty and day.
type LabKey = (String, Weekday, String, usize);

/// Extracts the faculty schedule of one normalized sheet.
///
/// Lab-pair bookkeeping lives for this call only.
pub fn extract_grid(grid: &Grid, config: &PipelineConfig) -> FacultySchedule {
    let mut schedule = FacultySchedule::new();
    let mut joint_columns = Vec::new();

    for (col, header) in grid.columns.iter().enumerate().skip(FIRST_FACULTY_COLUMN) {
        match classify_column(header, config) {
            Some(ColumnKind::Faculty(name)) => {
                schedule.ensure_faculty(&name);
            }
            Some(ColumnKind::JointSession) => joint_columns.push(col),
            None => {}
        }
    }

    let mut seen_labs: HashSet<LabKey> = HashSet::new();
    for (col, header) in grid.columns.iter().enumerate().skip(FIRST_FACULTY_COLUMN) {
        if let Some(ColumnKind::Faculty(name)) = classify_column(header, config) {
            extract_faculty_column(grid, col, &name, &mut seen_labs, &mut schedule);
        }
    }
    for col in joint_columns {
        extract_joint_column(grid, col, &mut schedule);
    }
    schedule
}

/// Weekday of a data row, or `None` when the row must be skipped.
fn row_day(grid: &Grid, row: usize) -> Option<Weekday> {
    grid.cell(row, DAY_COLUMN).as_text().and_then(Weekday::from_token)
}

fn extract_faculty_column(
    grid: &Grid,
    col: usize,
    faculty: &str,
    seen_labs: &mut HashSet<LabKey>,
    schedule: &mut FacultySchedule,
) {
    for row in 0..grid.rows.len() {
        let value = grid.cell(row, col);
        if value.is_empty() {
            continue;
        }
        let Some(day) = row_day(grid, row) else {
            log::debug!(
                "{faculty}: row {row} has unknown day {:?}; skipped",
                grid.cell(row, DAY_COLUMN).to_string()
            );
            continue;
        };

        let above = row.checked_sub(1).map(|r| grid.cell(r, col));
        let below = (row + 1 < grid.rows.len()).then(|| grid.cell(row + 1, col));
        let pair_start = if above == Some(value) {
            Some(row - 1)
        } else if below == Some(value) {
            Some(row)
        } else {
            None
        };
        if let Some(start) = pair_start {
            let key = (faculty.to_string(), day, value.to_string(), start);
            if !seen_labs.insert(key) {
                continue;
            }
        }

        let Some(time_slot) = grid.cell(row, TIME_SLOT_COLUMN).as_integer() else {
            log::debug!(
                "{faculty}: row {row} has unparseable time slot {:?}; dropped",
                grid.cell(row, TIME_SLOT_COLUMN).to_string()
            );
            continue;
        };
        let session_type = if pair_start.is_some() {
            SessionType::Lab
        } else {
            SessionType::Lecture
        };
        schedule.push(
            faculty,
            day,
            ScheduleEntry {
                subject: value.to_string(),
                session_type,
                time_slot,
            },
        );
    }
}

/// Splits `"<subject> (<faculty>)"` into trimmed subject and faculty.
pub fn split_joint_session(value: &str) -> Option<(&str, &str)> {
    let open = value.find('(')?;
    let mut depth = 0usize;
    let mut close = None;
    for (i, c) in value[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + i);
                    break;
                }
            }
            _ => {}
        }
    }
    let subject = value[..open].trim();
    let faculty = value[open + 1..close?].trim();
    if subject.is_empty() || faculty.is_empty() {
        return None;
    }
    Some((subject, faculty))
}

fn extract_joint_column(grid: &Grid, col: usize, schedule: &mut FacultySchedule) {
    for row in 0..grid.rows.len() {
        let value = grid.cell(row, col);
        if value.is_empty() {
            continue;
        }
        let Some(day) = row_day(grid, row) else {
            continue;
        };
        let text = value.to_string();
        let Some((subject, faculty)) = split_joint_session(&text) else {
            log::debug!("joint session {text:?} at row {row} is malformed; dropped");
            continue;
        };
        let Some(time_slot) = grid.cell(row, TIME_SLOT_COLUMN).as_integer() else {
            log::debug!("joint session {text:?} at row {row} has no time slot; dropped");
            continue;
        };
        let session_type = if subject.ends_with(|c: char| c.is_ascii_digit()) {
            SessionType::Lab
        } else {
            SessionType::Lecture
        };
        schedule.push(
            faculty,
            day,
            ScheduleEntry {
                subject: subject.to_string(),
                session_type,
                time_slot,
            },
        );
    }
}

/// Normalizes and extracts every sheet, merging the results in sheet order.
pub fn extract_workbook(workbook: &Workbook, config: &PipelineConfig) -> FacultySchedule {
    let mut merged = FacultySchedule::new();
    for sheet in &workbook.sheets {
        let grid = grid::normalize(sheet);
        if grid.is_empty() {
            continue;
        }
        let schedule = extract_grid(&grid, config);
        log::info!(
            "sheet `{}`: {} faculty, {} entries",
            sheet.name,
            schedule.len(),
            schedule.entries().count()
        );
        merged.merge(schedule);
    }
    merged
}
