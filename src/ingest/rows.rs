use chrono::{DateTime, Utc};

use super::{Table, dedupe_ids};
use crate::models::meeting::aliases::{self, FieldKey};
use crate::models::meeting::MeetingRecord;

/// Decode spreadsheet rows into records, stamping defaults with the current time.
pub fn decode_rows(headers: &[String], rows: &[Vec<String>]) -> Vec<MeetingRecord> {
    decode_rows_at(headers, rows, Utc::now())
}

pub fn decode_table_at(table: &Table, now: DateTime<Utc>) -> Vec<MeetingRecord> {
    decode_rows_at(&table.headers, &table.rows, now)
}

/// Decode rows against a header list.
///
/// Cells missing at the end of a short row read as empty. Blank rows and
/// rows without name, email or purpose are dropped; the rest keep their
/// order. A header row with no usable names yields an empty list.
pub fn decode_rows_at(headers: &[String], rows: &[Vec<String>], now: DateTime<Utc>) -> Vec<MeetingRecord> {
    let keys: Vec<Option<FieldKey>> = headers.iter().map(|h| aliases::resolve(h)).collect();
    if keys.iter().all(Option::is_none) {
        log::warn!("Sheet has no usable header row ({} data rows ignored)", rows.len());
        return Vec::new();
    }

    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for (index, row) in rows.iter().enumerate() {
        let mut record = MeetingRecord::default();
        for (position, key) in keys.iter().enumerate() {
            let Some(key) = key else { continue };
            let value = row.get(position).cloned().unwrap_or_default();
            if matches!(key, FieldKey::Other(_)) && value.trim().is_empty() {
                continue;
            }
            record.set(key, value);
        }

        if record.is_blank() {
            continue;
        }

        // Header is sheet row 1, so data row `index` sits on row `index + 2`.
        let sheet_row = index + 2;
        record.apply_defaults(|| format!("sheet_{sheet_row}"), now);

        if !record.is_valid() {
            dropped += 1;
            log::debug!("Skipping sheet row {}: missing name, email or purpose", sheet_row);
            continue;
        }
        records.push(record);
    }

    if dropped > 0 {
        log::info!("Row decoder dropped {} incomplete rows", dropped);
    }
    dedupe_ids(records)
}
