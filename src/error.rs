use std::path::PathBuf;

/// Failure to load a workbook.
///
/// Only [`crate::load_workbook`] and friends return these; a workbook that
/// loads always produces a schedule.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported extension `{extension}` for workbook `{path}`")]
    UnsupportedExtension { path: PathBuf, extension: String },
    #[error("workbook `{path}` is a {format} file, which cannot be read; save it as .xlsx")]
    UnsupportedFormat { path: PathBuf, format: &'static str },
    #[error("workbook `{path}` is not an .xlsx package or a JSON workbook")]
    UnrecognizedContent { path: PathBuf },
    #[error("failed to open workbook `{path}`: {source}")]
    OpenIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open `.xlsx` workbook `{path}`: {source}")]
    OpenXlsx {
        path: PathBuf,
        #[source]
        source: calamine_styles::XlsxError,
    },
    #[error("failed to parse JSON workbook `{path}`: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read sheet `{sheet}`: {source}")]
    SheetValues {
        sheet: String,
        #[source]
        source: calamine_styles::XlsxError,
    },
    #[error("package part not found: {0}")]
    MissingPart(String),
    #[error("invalid merge cell reference `{reference}`: {message}")]
    InvalidMergeRef { reference: String, message: String },
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
