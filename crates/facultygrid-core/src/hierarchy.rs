//! Condensation of division tables and assembly of the final schedule.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::config::PipelineConfig;
use crate::division::{DivisionRow, DivisionTables};
use crate::extract::SessionType;

/// A division row with day and time slot dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CondensedRow {
    pub subject: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub batch: String,
    pub faculty: String,
}

impl From<&DivisionRow> for CondensedRow {
    fn from(row: &DivisionRow) -> Self {
        Self {
            subject: row.subject.clone(),
            session_type: row.session_type,
            batch: row.batch.clone(),
            faculty: row.faculty.clone(),
        }
    }
}

/// Removes exact duplicates (first occurrence kept) and sorts by subject
/// then batch. Applying it to its own output changes nothing.
pub fn condense<I>(rows: I) -> Vec<CondensedRow>
where
    I: IntoIterator<Item = CondensedRow>,
{
    let mut seen = HashSet::new();
    let mut out: Vec<CondensedRow> = rows
        .into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect();
    out.sort_by(|a, b| (&a.subject, &a.batch).cmp(&(&b.subject, &b.batch)));
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Designation {
    pub designated_faculty: String,
}

impl Designation {
    fn new(faculty: &str) -> Self {
        Self {
            designated_faculty: faculty.to_string(),
        }
    }
}

/// Who teaches one subject to one division.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAllocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lectures: Option<Designation>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labs: BTreeMap<String, Designation>,
}

/// Subject code to allocation.
pub type DivisionSubjects = BTreeMap<String, SubjectAllocation>;

/// institution → department → semester → division → subject → allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalSchedule(
    pub BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, DivisionSubjects>>>>,
);

impl FinalSchedule {
    /// Subjects of one division, e.g. `("LDRP-ITR", "CE", "2", "2A")`.
    pub fn division(
        &self,
        institution: &str,
        department: &str,
        semester: &str,
        division: &str,
    ) -> Option<&DivisionSubjects> {
        self.0
            .get(institution)?
            .get(department)?
            .get(semester)?
            .get(division)
    }

    /// Division keys in order, across every institution and department.
    pub fn division_keys(&self) -> Vec<&str> {
        self.0
            .values()
            .flat_map(|departments| departments.values())
            .flat_map(|semesters| semesters.values())
            .flat_map(|divisions| divisions.keys().map(String::as_str))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.division_keys().is_empty()
    }
}

/// Allocations of one division from its condensed rows.
pub fn allocate(rows: &[CondensedRow]) -> DivisionSubjects {
    let mut subjects = DivisionSubjects::new();
    for row in rows {
        let allocation = subjects.entry(row.subject.clone()).or_default();
        match row.session_type {
            SessionType::Lecture => match &allocation.lectures {
                None => allocation.lectures = Some(Designation::new(&row.faculty)),
                Some(kept) if kept.designated_faculty != row.faculty => log::debug!(
                    "{}: lecture also taught by {}; keeping {}",
                    row.subject,
                    row.faculty,
                    kept.designated_faculty
                ),
                Some(_) => {}
            },
            SessionType::Lab => {
                allocation
                    .labs
                    .entry(row.batch.clone())
                    .or_insert_with(|| Designation::new(&row.faculty));
            }
        }
    }
    subjects
}

/// Condenses every division table and nests the results under the
/// configured institution and department.
pub fn aggregate(tables: &DivisionTables, config: &PipelineConfig) -> FinalSchedule {
    let mut semesters: BTreeMap<String, BTreeMap<String, DivisionSubjects>> = BTreeMap::new();
    for (division, rows) in tables {
        let Some(semester) = division.chars().next() else {
            continue;
        };
        let condensed = condense(rows.iter().map(CondensedRow::from));
        semesters
            .entry(semester.to_string())
            .or_default()
            .insert(division.clone(), allocate(&condensed));
    }

    let mut schedule = FinalSchedule::default();
    if !semesters.is_empty() {
        schedule
            .0
            .entry(config.institution.clone())
            .or_default()
            .insert(config.department.clone(), semesters);
    }
    schedule
}
