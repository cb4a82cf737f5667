//! Small OOXML package helpers: part reads, relationship maps, attributes.

use std::collections::HashMap;
use std::io::{Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::Error;

pub fn zip_read_to_string<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    name: &str,
) -> Result<String, Error> {
    zip_read_to_string_opt(zip, name)?.ok_or_else(|| Error::MissingPart(name.to_string()))
}

pub fn zip_read_to_string_opt<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, Error> {
    let mut file = match zip.by_name(name) {
        Ok(f) => f,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut out = String::new();
    file.read_to_string(&mut out)?;
    Ok(Some(out))
}

/// Unescaped value of the attribute named `key`, if present. A malformed
/// attribute anywhere on the element is an error.
pub fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, Error> {
    find_attr(e, |k| k == key)
}

/// Like [`attr_value`], matching on the attribute's local name.
pub fn attr_value_local(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, Error> {
    find_attr(e, |k| k.rsplit(|b| *b == b':').next() == Some(local))
}

fn find_attr(e: &BytesStart<'_>, matches: impl Fn(&[u8]) -> bool) -> Result<Option<String>, Error> {
    for attr in e.attributes() {
        let attr = attr?;
        if matches(attr.key.as_ref()) {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// `(sheet name, relationship id)` pairs from `xl/workbook.xml`, in order.
pub fn parse_workbook_sheet_rids(xml: &str) -> Result<Vec<(String, String)>, Error> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf: Vec<u8> = Vec::new();
    let mut out = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let name = attr_value(&e, b"name")?;
                let rid = match attr_value(&e, b"r:id")? {
                    Some(rid) => Some(rid),
                    None => attr_value_local(&e, b"id")?,
                };
                if let (Some(name), Some(rid)) = (name, rid) {
                    out.push((name, rid));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

/// Relationship id to target from a `.rels` part.
pub fn parse_relationship_targets(xml: &str) -> Result<HashMap<String, String>, Error> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf: Vec<u8> = Vec::new();
    let mut out = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_value(&e, b"Id")?, attr_value(&e, b"Target")?)
                {
                    out.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

/// Resolves a relationship target against the directory of its source part.
pub fn join_and_normalize(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}
