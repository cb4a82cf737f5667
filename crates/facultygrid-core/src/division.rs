//! Division tables: faculty entries fanned out per `<semester><division>`.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::day::Weekday;
use crate::extract::{FacultySchedule, SessionType};
use crate::subject::{parse_subject, Divisions, SubjectDescriptor};

/// Batch value recorded for lecture rows.
pub const LECTURE_BATCH: &str = "-";

/// A time slot or an inclusive slot range.
///
/// Ordered on `(start, end)` with a single slot before any range starting
/// at the same slot. Rendered as `"k"` or `"k-m"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    pub start: i64,
    pub end: Option<i64>,
}

impl TimeSlot {
    pub fn single(slot: i64) -> Self {
        Self {
            start: slot,
            end: None,
        }
    }

    pub fn range(start: i64, end: i64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Last slot covered.
    pub fn last(&self) -> i64 {
        self.end.unwrap_or(self.start)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of a division's timetable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DivisionRow {
    pub subject: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub batch: String,
    pub day: Weekday,
    pub time_slot: TimeSlot,
    pub faculty: String,
}

impl DivisionRow {
    pub fn is_lab(&self) -> bool {
        self.session_type == SessionType::Lab
    }
}

/// Division key (`"2A"`) to its rows, in insertion order.
pub type DivisionTables = BTreeMap<String, Vec<DivisionRow>>;

/// Concrete divisions observed per semester.
pub fn observed_divisions<'a, I>(descriptors: I) -> BTreeMap<u8, BTreeSet<String>>
where
    I: IntoIterator<Item = &'a SubjectDescriptor>,
{
    let mut observed: BTreeMap<u8, BTreeSet<String>> = BTreeMap::new();
    for d in descriptors {
        if let Divisions::Explicit(divisions) = &d.divisions {
            observed
                .entry(d.semester)
                .or_default()
                .extend(divisions.iter().cloned());
        }
    }
    observed
}

struct ParsedEntry<'a> {
    faculty: &'a str,
    day: Weekday,
    time_slot: i64,
    descriptor: SubjectDescriptor,
}

/// Builds every division table from the merged faculty schedule.
///
/// `ALL` subjects resolve to the divisions seen for their semester anywhere
/// in the schedule. Lab entries produce a second row one slot later.
pub fn build_division_tables(schedule: &FacultySchedule) -> DivisionTables {
    let parsed: Vec<ParsedEntry<'_>> = schedule
        .entries()
        .filter_map(|(faculty, day, entry)| match parse_subject(&entry.subject) {
            Some(descriptor) => Some(ParsedEntry {
                faculty,
                day,
                time_slot: entry.time_slot,
                descriptor,
            }),
            None => {
                log::debug!("{faculty}: {:?} is not a subject code; skipped", entry.subject);
                None
            }
        })
        .collect();

    let observed = observed_divisions(parsed.iter().map(|p| &p.descriptor));
    let mut tables = DivisionTables::new();

    for p in &parsed {
        let d = &p.descriptor;
        let targets: Vec<&String> = match &d.divisions {
            Divisions::Explicit(divisions) if divisions.is_empty() => {
                log::debug!(
                    "{} ({}) names no division letter; dropped",
                    d.code,
                    p.faculty
                );
                Vec::new()
            }
            Divisions::Explicit(divisions) => divisions.iter().collect(),
            Divisions::All => match observed.get(&d.semester) {
                Some(divisions) => divisions.iter().collect(),
                None => {
                    log::warn!(
                        "{} ({}) addresses all divisions of semester {}, but none were observed; dropped",
                        d.code,
                        p.faculty,
                        d.semester
                    );
                    Vec::new()
                }
            },
        };

        let second_slot = if d.is_lab {
            let Some(next) = p.time_slot.checked_add(1) else {
                log::debug!(
                    "{} ({}) lab at slot {} has no following slot; dropped",
                    d.code,
                    p.faculty,
                    p.time_slot
                );
                continue;
            };
            Some(next)
        } else {
            None
        };
        let session_type = if d.is_lab {
            SessionType::Lab
        } else {
            SessionType::Lecture
        };
        let batch = d.batch.clone().unwrap_or_else(|| LECTURE_BATCH.to_string());

        for division in targets {
            let rows = tables
                .entry(format!("{}{}", d.semester, division))
                .or_default();
            let row = DivisionRow {
                subject: d.code.clone(),
                session_type,
                batch: batch.clone(),
                day: p.day,
                time_slot: TimeSlot::single(p.time_slot),
                faculty: p.faculty.to_string(),
            };
            if let Some(slot) = second_slot {
                let second = DivisionRow {
                    time_slot: TimeSlot::single(slot),
                    ..row.clone()
                };
                rows.push(row);
                rows.push(second);
            } else {
                rows.push(row);
            }
        }
    }
    tables
}
