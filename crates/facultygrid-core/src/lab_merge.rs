//! Collapses the two slot rows of a lab into one ranged row.

use std::cmp::Ordering;

use crate::division::{DivisionRow, DivisionTables, TimeSlot};

/// Timetable order: day, slot, batch.
pub fn timetable_order(a: &DivisionRow, b: &DivisionRow) -> Ordering {
    (a.day, a.time_slot, &a.batch, &a.subject, &a.faculty)
        .cmp(&(b.day, b.time_slot, &b.batch, &b.subject, &b.faculty))
}

/// Orders rows so that the halves of one lab sit next to each other even
/// when other batches share the same slots.
fn pairing_order(a: &DivisionRow, b: &DivisionRow) -> Ordering {
    (a.day, &a.batch, &a.subject, &a.faculty, a.time_slot)
        .cmp(&(b.day, &b.batch, &b.subject, &b.faculty, b.time_slot))
}

fn continues(row: &DivisionRow, next: &DivisionRow) -> bool {
    row.is_lab()
        && next.is_lab()
        && row.day == next.day
        && row.subject == next.subject
        && row.batch == next.batch
        && row.faculty == next.faculty
        && next.time_slot.end.is_none()
        && row.time_slot.last().checked_add(1) == Some(next.time_slot.start)
}

/// Merges lab rows of one division whose next slot is the same lab.
///
/// Only pairs are merged; a row that was already extended is not extended
/// again. The result is in timetable order.
pub fn merge_lab_sessions(rows: &[DivisionRow]) -> Vec<DivisionRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(pairing_order);

    let mut merged = Vec::with_capacity(sorted.len());
    let mut iter = sorted.into_iter().peekable();
    while let Some(mut row) = iter.next() {
        if row.time_slot.end.is_none() {
            if let Some(next) = iter.next_if(|next| continues(&row, next)) {
                row.time_slot = TimeSlot::range(row.time_slot.start, next.time_slot.start);
            }
        }
        merged.push(row);
    }

    merged.sort_by(timetable_order);
    merged
}

/// Applies [`merge_lab_sessions`] to every division table.
pub fn merge_all(tables: &DivisionTables) -> DivisionTables {
    tables
        .iter()
        .map(|(key, rows)| (key.clone(), merge_lab_sessions(rows)))
        .collect()
}
