//! Workbook loading for the faculty timetable pipeline.
//!
//! `.xlsx`/`.xlsm` files are read through calamine, with merged ranges taken
//! from each worksheet's `<mergeCells>`; JSON files hold a pre-parsed
//! [`Workbook`]. Everything after loading lives in `facultygrid-core`.

use std::path::Path;

pub use facultygrid_core::*;

mod calamine_backend;
pub mod classify;
mod error;
mod ooxml_util;
mod util;

pub use classify::WorkbookFormat;
pub use error::Error;
pub use util::{a1_to_row_col, parse_a1_range};

/// Reads and parses a workbook file.
pub fn load_workbook(path: impl AsRef<Path>) -> Result<Workbook, Error> {
    let path = path.as_ref();
    classify::check_extension(path)?;
    let bytes = std::fs::read(path).map_err(|source| Error::OpenIo {
        path: path.to_path_buf(),
        source,
    })?;
    load_workbook_bytes(&bytes, path)
}

/// Parses workbook bytes; `path` is only used in error messages and logs.
pub fn load_workbook_bytes(bytes: &[u8], path: &Path) -> Result<Workbook, Error> {
    let format = classify::sniff(bytes).ok_or_else(|| Error::UnrecognizedContent {
        path: path.to_path_buf(),
    })?;
    log::debug!("{}: detected {}", path.display(), format.label());
    let workbook = match format {
        WorkbookFormat::Xlsx => calamine_backend::read_xlsx(bytes, path)?,
        WorkbookFormat::Json => {
            let mut workbook: Workbook =
                serde_json::from_slice(bytes).map_err(|source| Error::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
            workbook.sheets.iter_mut().for_each(Sheet::snapshot_anchors);
            workbook
        }
        WorkbookFormat::Xls => {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                format: format.label(),
            })
        }
    };
    log::info!("{}: loaded {} sheets", path.display(), workbook.sheets.len());
    Ok(workbook)
}

/// Loads a workbook and runs the pipeline, keeping intermediate tables.
pub fn process_file_detailed(
    path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PipelineOutput, Error> {
    let workbook = load_workbook(path)?;
    Ok(run_detailed(&workbook, config))
}

/// Loads a workbook and returns its curriculum schedule.
pub fn process_file(path: impl AsRef<Path>, config: &PipelineConfig) -> Result<FinalSchedule, Error> {
    Ok(process_file_detailed(path, config)?.schedule)
}
