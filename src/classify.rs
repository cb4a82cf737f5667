//! Workbook format detection: extension allow-list, then magic bytes.

use std::path::Path;

use crate::error::Error;

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Extensions accepted as workbook inputs (compared case-insensitively).
/// Legacy `.xls` is not listed: its merged ranges cannot be read.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// OOXML zip package (`.xlsx` / `.xlsm`).
    Xlsx,
    /// Legacy BIFF workbook in an OLE container; detected only to be
    /// rejected with a clear error.
    Xls,
    /// Pre-parsed workbook serialized as JSON.
    Json,
}

impl WorkbookFormat {
    pub fn label(self) -> &'static str {
        match self {
            WorkbookFormat::Xlsx => "xlsx",
            WorkbookFormat::Xls => "legacy .xls",
            WorkbookFormat::Json => "JSON",
        }
    }
}

/// Rejects paths whose extension is not in [`ALLOWED_EXTENSIONS`].
pub fn check_extension(path: &Path) -> Result<(), Error> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(Error::UnsupportedExtension {
            path: path.to_path_buf(),
            extension,
        })
    }
}

/// Detects the format from the leading bytes. Extensions are not trusted.
pub fn sniff(bytes: &[u8]) -> Option<WorkbookFormat> {
    if bytes.starts_with(&ZIP_MAGIC) {
        return Some(WorkbookFormat::Xlsx);
    }
    if bytes.starts_with(&OLE_MAGIC) {
        return Some(WorkbookFormat::Xls);
    }
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match body.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Some(WorkbookFormat::Json),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions() {
        assert!(check_extension(Path::new("ce.xlsx")).is_ok());
        assert!(check_extension(Path::new("CE.XLSM")).is_ok());
        assert!(matches!(
            check_extension(Path::new("old.xls")),
            Err(Error::UnsupportedExtension { extension, .. }) if extension == "xls"
        ));
        assert!(check_extension(Path::new("dump.json")).is_ok());
        assert!(matches!(
            check_extension(Path::new("grid.csv")),
            Err(Error::UnsupportedExtension { extension, .. }) if extension == "csv"
        ));
        assert!(check_extension(Path::new("noext")).is_err());
    }

    #[test]
    fn magic_bytes() {
        assert_eq!(sniff(b"PK\x03\x04rest"), Some(WorkbookFormat::Xlsx));
        assert_eq!(sniff(&OLE_MAGIC), Some(WorkbookFormat::Xls));
        assert_eq!(sniff(b"  \n{\"sheets\": []}"), Some(WorkbookFormat::Json));
        assert_eq!(sniff(b"\xEF\xBB\xBF{}"), Some(WorkbookFormat::Json));
        assert_eq!(sniff(b"Day,Slot"), None);
        assert_eq!(sniff(b""), None);
    }
}
