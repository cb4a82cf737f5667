use serde::Serialize;

use crate::cell::Workbook;
use crate::config::PipelineConfig;
use crate::division::{build_division_tables, DivisionTables};
use crate::extract::{extract_workbook, FacultySchedule};
use crate::hierarchy::{aggregate, FinalSchedule};
use crate::lab_merge::merge_all;

/// Every intermediate product of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineOutput {
    /// Per-faculty schedule merged across sheets.
    pub faculty: FacultySchedule,
    /// Division timetables with lab pairs merged, in timetable order.
    pub divisions: DivisionTables,
    pub schedule: FinalSchedule,
}

/// Runs the whole pipeline, keeping the intermediate tables.
pub fn run_detailed(workbook: &Workbook, config: &PipelineConfig) -> PipelineOutput {
    let faculty = extract_workbook(workbook, config);
    let tables = build_division_tables(&faculty);
    let divisions = merge_all(&tables);
    let schedule = aggregate(&divisions, config);
    log::info!(
        "{} sheets, {} faculty, {} divisions",
        workbook.sheets.len(),
        faculty.len(),
        divisions.len()
    );
    PipelineOutput {
        faculty,
        divisions,
        schedule,
    }
}

/// Converts a parsed workbook into the final curriculum schedule.
pub fn run(workbook: &Workbook, config: &PipelineConfig) -> FinalSchedule {
    run_detailed(workbook, config).schedule
}
