//! `.xlsx` reading: cell values through calamine, merged ranges straight
//! from the worksheet XML.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine_styles::{Data, Range, Reader, Xlsx};
use facultygrid_core::{CellValue, MergedRange, Sheet, Workbook};
use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use zip::ZipArchive;

use crate::error::Error;
use crate::ooxml_util;
use crate::util::parse_a1_range;

type XlsxReader<'a> = Xlsx<Cursor<&'a [u8]>>;

fn data_to_cell(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::text(s.as_str()),
        Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::RichText(rt) => CellValue::text(rt.plain_text()),
        Data::Error(e) => {
            log::debug!("cell error value {e:?} read as empty");
            CellValue::Empty
        }
    }
}

/// Dense rows from `A1` to the range's last cell, so grid coordinates match
/// worksheet coordinates.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((end_row, end_col)) = range.end() else {
        return Vec::new();
    };
    (0..=end_row)
        .map(|row| {
            (0..=end_col)
                .map(|col| {
                    range
                        .get_value((row, col))
                        .map(data_to_cell)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect()
}

/// An open `.xlsx` workbook backed by an in-memory buffer.
pub struct XlsxBook<'a> {
    workbook: XlsxReader<'a>,
    zip: ZipArchive<Cursor<&'a [u8]>>,
    sheet_names: Vec<String>,
    /// Sheet name -> `xl/worksheets/sheetN.xml`, resolved via workbook.xml + rels.
    sheet_xml_paths: Option<HashMap<String, String>>,
}

impl<'a> XlsxBook<'a> {
    pub fn open(bytes: &'a [u8], path: &Path) -> Result<Self, Error> {
        let workbook: XlsxReader<'a> =
            Xlsx::new(Cursor::new(bytes)).map_err(|source| Error::OpenXlsx {
                path: path.to_path_buf(),
                source,
            })?;
        let zip = ZipArchive::new(Cursor::new(bytes))?;
        let sheet_names = workbook.sheet_names().to_vec();
        Ok(Self {
            workbook,
            zip,
            sheet_names,
            sheet_xml_paths: None,
        })
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Reads one sheet's values and merged ranges.
    pub fn read_sheet(&mut self, sheet: &str) -> Result<Sheet, Error> {
        let range = self
            .workbook
            .worksheet_range(sheet)
            .map_err(|source| Error::SheetValues {
                sheet: sheet.to_string(),
                source,
            })?;
        let mut out = Sheet::new(sheet).with_rows(range_to_rows(&range));

        let xml = self.sheet_xml_content(sheet)?;
        for reference in Self::parse_merged_ranges_from_sheet_xml(&xml)? {
            let (r0, c0, r1, c1) =
                parse_a1_range(&reference).map_err(|message| Error::InvalidMergeRef {
                    reference: reference.clone(),
                    message,
                })?;
            out = out.with_merge(MergedRange::new(
                r0 as usize,
                c0 as usize,
                r1 as usize,
                c1 as usize,
            ));
        }
        Ok(out)
    }

    /// Reads every sheet. A sheet that cannot be read is logged and left
    /// out; the rest still load.
    pub fn read_all(&mut self) -> Workbook {
        let names = self.sheet_names.clone();
        let mut sheets = Vec::with_capacity(names.len());
        for name in names {
            match self.read_sheet(&name) {
                Ok(sheet) => sheets.push(sheet),
                Err(e) => log::warn!("skipping sheet `{name}`: {e}"),
            }
        }
        Workbook::new(sheets)
    }

    fn ensure_sheet_xml_paths(&mut self) -> Result<(), Error> {
        if self.sheet_xml_paths.is_some() {
            return Ok(());
        }

        let workbook_xml = ooxml_util::zip_read_to_string(&mut self.zip, "xl/workbook.xml")?;
        let rels_xml =
            ooxml_util::zip_read_to_string(&mut self.zip, "xl/_rels/workbook.xml.rels")?;

        let sheet_rids = ooxml_util::parse_workbook_sheet_rids(&workbook_xml)?;
        let rel_targets = ooxml_util::parse_relationship_targets(&rels_xml)?;

        let mut map: HashMap<String, String> = HashMap::new();
        for (name, rid) in sheet_rids {
            if let Some(target) = rel_targets.get(&rid) {
                let full = ooxml_util::join_and_normalize("xl/", target);
                map.insert(name, full);
            }
        }

        self.sheet_xml_paths = Some(map);
        Ok(())
    }

    fn sheet_xml_content(&mut self, sheet: &str) -> Result<String, Error> {
        self.ensure_sheet_xml_paths()?;
        let path = self
            .sheet_xml_paths
            .as_ref()
            .and_then(|map| map.get(sheet))
            .cloned()
            .ok_or_else(|| Error::MissingPart(format!("worksheet XML for `{sheet}`")))?;
        ooxml_util::zip_read_to_string(&mut self.zip, &path)
    }

    fn parse_merged_ranges_from_sheet_xml(xml: &str) -> Result<Vec<String>, Error> {
        let mut reader = XmlReader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut buf: Vec<u8> = Vec::new();
        let mut out: Vec<String> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"mergeCell" => {
                    if let Some(r) = ooxml_util::attr_value(&e, b"ref")? {
                        out.push(r);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(out)
    }
}

/// Loads every readable sheet of an `.xlsx` buffer.
pub fn read_xlsx(bytes: &[u8], path: &Path) -> Result<Workbook, Error> {
    let mut book = XlsxBook::open(bytes, path)?;
    Ok(book.read_all())
}
