//! Faculty-matrix timetable pipeline.
//!
//! Turns a faculty timetable workbook (rows are day/time-slot pairs, columns
//! are faculty, cells hold subject/class codes) into a curriculum schedule
//! keyed by institution, department, semester, division and subject.
//!
//! # Stages
//!
//! - **`grid`**: merged-cell expansion and header-row detection
//! - **`extract`**: per-faculty schedules with lab-pair detection, merged
//!   across sheets
//! - **`subject`**: subject/class code decoding
//! - **`division`**: per-division tables with `ALL` broadcast and two-slot
//!   lab expansion
//! - **`lab_merge`**: collapsing the two rows of a lab into a slot range
//! - **`hierarchy`**: condensation and final nesting
//!
//! Nothing here performs I/O; see the `facultygrid` crate for workbook
//! loading. Malformed cells and rows are skipped and reported through the
//! `log` facade, never as errors.

pub mod cell;
pub mod config;
pub mod day;
pub mod division;
pub mod extract;
pub mod grid;
pub mod hierarchy;
pub mod lab_merge;
pub mod pipeline;
pub mod subject;

pub use cell::{CellValue, MergedRange, Sheet, Workbook};
pub use config::PipelineConfig;
pub use day::Weekday;
pub use division::{build_division_tables, DivisionRow, DivisionTables, TimeSlot};
pub use extract::{extract_workbook, FacultySchedule, ScheduleEntry, SessionType};
pub use grid::{normalize, Grid};
pub use hierarchy::{aggregate, condense, Designation, FinalSchedule, SubjectAllocation};
pub use lab_merge::{merge_all, merge_lab_sessions};
pub use pipeline::{run, run_detailed, PipelineOutput};
pub use subject::{parse_subject, Divisions, SubjectDescriptor};
