//! Subject/class code decoding.
//!
//! A faculty cell such as `"CS301 2A/B*1"` names a subject code followed by
//! class information: the semester digit, one or more `/`-separated
//! divisions, and an optional lab batch. `ALL` in the class information
//! addresses every division of the semester.

use serde::Serialize;
use std::collections::BTreeSet;

/// The divisions a subject is taught to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Divisions {
    /// Every division observed for the semester.
    All,
    Explicit(BTreeSet<String>),
}

/// A decoded subject code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectDescriptor {
    pub code: String,
    pub semester: u8,
    pub divisions: Divisions,
    /// Lab batch, digits or `*`.
    pub batch: Option<String>,
    pub is_lab: bool,
}

/// Decodes a subject cell, returning `None` for anything that is not a
/// subject code (tutorials, single words, missing semester).
pub fn parse_subject(raw: &str) -> Option<SubjectDescriptor> {
    if raw.trim().is_empty() || raw.contains("TUT") {
        return None;
    }
    let mut tokens = raw.split_whitespace();
    let code = tokens.next()?.to_string();
    let class_info: String = tokens.collect();
    if class_info.is_empty() {
        return None;
    }

    let (digit_at, semester) = class_info
        .char_indices()
        .take(2)
        .find_map(|(i, c)| c.to_digit(10).map(|d| (i, d as u8)))?;

    if class_info.contains("ALL") {
        return Some(SubjectDescriptor {
            code,
            semester,
            divisions: Divisions::All,
            batch: None,
            is_lab: false,
        });
    }

    let mut divisions = BTreeSet::new();
    let mut batch = None;
    for part in class_info[digit_at + 1..].split('/') {
        let letters: String = part
            .chars()
            .filter(|c| c.is_alphabetic())
            .flat_map(char::to_uppercase)
            .collect();
        if !letters.is_empty() {
            divisions.insert(letters);
        }
        if let Some(found) = batch_code(part) {
            // Several parts naming a batch: the last one wins.
            batch = Some(found);
        }
    }

    let is_lab = batch.is_some();
    Some(SubjectDescriptor {
        code,
        semester,
        divisions: Divisions::Explicit(divisions),
        batch,
        is_lab,
    })
}

/// Batch code of one division part: its digits, or `*` when the part is
/// starred without a batch number.
fn batch_code(part: &str) -> Option<String> {
    let digits: String = part.chars().filter(char::is_ascii_digit).collect();
    if !digits.is_empty() {
        Some(digits)
    } else if part.contains('*') {
        Some("*".to_string())
    } else {
        None
    }
}
