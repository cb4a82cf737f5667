use std::io::{Cursor, Write};
use std::path::Path;

use facultygrid::{
    load_workbook, load_workbook_bytes, process_file, process_file_detailed, CellValue, Error,
    PipelineConfig, Weekday,
};
use serde_json::json;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets><sheet name="CE" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

// Day in A2:A4 and the lab in C2:C3 are merged; D holds a lecture.
const SHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1">
      <c r="A1" t="inlineStr"><is><t>Day</t></is></c>
      <c r="B1" t="inlineStr"><is><t>Slot</t></is></c>
      <c r="C1" t="inlineStr"><is><t>ABC</t></is></c>
      <c r="D1" t="inlineStr"><is><t>PQR</t></is></c>
    </row>
    <row r="2">
      <c r="A2" t="inlineStr"><is><t>MON</t></is></c>
      <c r="B2"><v>1</v></c>
      <c r="C2" t="inlineStr"><is><t>CS301 2A/B1</t></is></c>
      <c r="D2" t="inlineStr"><is><t>MA201 2ALL</t></is></c>
    </row>
    <row r="3">
      <c r="B3"><v>2</v></c>
    </row>
    <row r="4">
      <c r="B4"><v>3</v></c>
      <c r="C4" t="inlineStr"><is><t>CS301 2B</t></is></c>
    </row>
  </sheetData>
  <mergeCells count="2">
    <mergeCell ref="A2:A4"/>
    <mergeCell ref="C2:C3"/>
  </mergeCells>
</worksheet>"#;

fn build_xlsx() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK_XML),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", SHEET_XML),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn write_temp(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn xlsx_values_and_merges_load() {
    let workbook = load_workbook_bytes(&build_xlsx(), Path::new("ce.xlsx")).unwrap();
    assert_eq!(workbook.sheets.len(), 1);
    let sheet = &workbook.sheets[0];
    assert_eq!(sheet.name, "CE");
    assert_eq!(sheet.rows[1][0], CellValue::text("MON"));
    assert_eq!(sheet.rows[2][1], CellValue::Number(2.0));
    assert!(sheet.rows[2][0].is_empty());

    let spans: Vec<_> = sheet
        .merged
        .iter()
        .map(|m| (m.first_row, m.first_col, m.last_row, m.last_col))
        .collect();
    assert_eq!(spans, vec![(1, 0, 3, 0), (1, 2, 2, 2)]);
    assert_eq!(sheet.merged[1].anchor, CellValue::text("CS301 2A/B1"));
}

#[test]
fn xlsx_file_runs_through_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(dir.path(), "ce.xlsx", &build_xlsx());

    let out = process_file_detailed(&path, &PipelineConfig::default()).unwrap();
    let monday = out.faculty.day("ABC", Weekday::Monday);
    assert_eq!(monday.len(), 2);
    assert_eq!(monday[0].time_slot, 1);
    assert_eq!(monday[1].subject, "CS301 2B");

    let json = serde_json::to_value(&out.schedule).unwrap();
    assert_eq!(
        json,
        json!({
            "LDRP-ITR": {"CE": {"2": {
                "2A": {
                    "CS301": {"labs": {"1": {"designated_faculty": "ABC"}}},
                    "MA201": {"lectures": {"designated_faculty": "PQR"}}
                },
                "2B": {
                    "CS301": {
                        "lectures": {"designated_faculty": "ABC"},
                        "labs": {"1": {"designated_faculty": "ABC"}}
                    },
                    "MA201": {"lectures": {"designated_faculty": "PQR"}}
                }
            }}}
        })
    );
    let slots: Vec<String> = out.divisions["2A"]
        .iter()
        .filter(|r| r.is_lab())
        .map(|r| r.time_slot.to_string())
        .collect();
    assert_eq!(slots, vec!["1-2".to_string()]);
}

#[test]
fn json_workbook_loads_with_missing_anchors() {
    let dir = tempfile::tempdir().unwrap();
    let body = json!({
        "sheets": [{
            "name": "CE",
            "rows": [
                ["Day", "Slot", "ABC"],
                ["FRI", 1, "OS 4C"],
                [null, 2, "DB 4C"]
            ],
            "merged": [{"first_row": 1, "first_col": 0, "last_row": 2, "last_col": 0}]
        }]
    });
    let path = write_temp(dir.path(), "ce.json", body.to_string().as_bytes());

    let config = PipelineConfig::default().with_institution("INST");
    let schedule = process_file(&path, &config).unwrap();
    let json = serde_json::to_value(&schedule).unwrap();
    assert_eq!(
        json["INST"]["CE"]["4"]["4C"],
        json!({
            "DB": {"lectures": {"designated_faculty": "ABC"}},
            "OS": {"lectures": {"designated_faculty": "ABC"}}
        })
    );
}

#[test]
fn unsupported_extension_rejected_before_reading() {
    let err = load_workbook("does/not/exist.csv").unwrap_err();
    assert!(matches!(err, Error::UnsupportedExtension { ref extension, .. } if extension == "csv"));
}

#[test]
fn legacy_xls_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    bytes.extend_from_slice(&[0; 504]);

    let path = write_temp(dir.path(), "old.xls", &bytes);
    assert!(matches!(
        load_workbook(&path),
        Err(Error::UnsupportedExtension { ref extension, .. }) if extension == "xls"
    ));

    // Renamed legacy files are caught by their content.
    let path = write_temp(dir.path(), "renamed.xlsx", &bytes);
    let err = load_workbook(&path).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
    assert!(err.to_string().contains(".xls"));
}

#[test]
fn unrecognized_content_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(dir.path(), "grid.xlsx", b"Day,Slot,ABC\n");
    assert!(matches!(
        load_workbook(&path),
        Err(Error::UnrecognizedContent { .. })
    ));
    assert!(matches!(
        load_workbook(dir.path().join("missing.xlsx")),
        Err(Error::OpenIo { .. })
    ));
}

/// Packages `(sheet name, worksheet xml)` pairs; a `None` body lists the
/// sheet in workbook.xml and its rels but leaves the part out.
fn build_multi_sheet_xlsx(sheets: &[(&str, Option<&str>)]) -> Vec<u8> {
    let mut workbook = String::from(
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        workbook.push_str(&format!(r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".into(), CONTENT_TYPES.into()),
        ("_rels/.rels".into(), ROOT_RELS.into()),
        ("xl/workbook.xml".into(), workbook),
        ("xl/_rels/workbook.xml.rels".into(), rels),
    ];
    for (i, (_, body)) in sheets.iter().enumerate() {
        if let Some(body) = body {
            parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), body.to_string()));
        }
    }
    for (name, body) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

const BAD_MERGE_SHEET_XML: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1" t="inlineStr"><is><t>Day</t></is></c><c r="C1" t="inlineStr"><is><t>XYZ</t></is></c></row>
    <row r="2"><c r="A2" t="inlineStr"><is><t>TUE</t></is></c><c r="B2"><v>1</v></c><c r="C2" t="inlineStr"><is><t>DB 4C</t></is></c></row>
  </sheetData>
  <mergeCells count="1"><mergeCell ref="ZZ"/></mergeCells>
</worksheet>"#;

#[test]
fn unreadable_sheets_are_skipped_and_the_rest_still_load() {
    for broken in [Some(BAD_MERGE_SHEET_XML), None] {
        let bytes = build_multi_sheet_xlsx(&[("Broken", broken), ("CE", Some(SHEET_XML))]);
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(dir.path(), "two.xlsx", &bytes);

        let workbook = load_workbook(&path).unwrap();
        let names: Vec<&str> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["CE"]);

        let out = process_file_detailed(&path, &PipelineConfig::default()).unwrap();
        assert!(out.faculty.get("XYZ").is_none());
        assert_eq!(out.faculty.day("ABC", Weekday::Monday).len(), 2);
        assert!(out.divisions.contains_key("2A"));
    }
}
