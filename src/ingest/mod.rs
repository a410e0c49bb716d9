//! Turning external payloads into canonical meeting records.
//!
//! - `csv` / `Table`: tabular input from the spreadsheet export
//! - `rows`: header + rows → records (Row Decoder)
//! - `normalize`: arbitrary webhook JSON → records (Response Normalizer)

pub mod csv;
pub mod normalize;
pub mod rows;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;

use crate::models::meeting::MeetingRecord;

pub use normalize::{Normalized, Shape, normalize, normalize_at};
pub use rows::{decode_rows, decode_rows_at, decode_table_at};

/// A header row plus data rows, cells already unquoted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// First CSV line is the header row.
    pub fn from_csv(text: &str) -> Self {
        let mut lines = csv::parse_csv(text).into_iter();
        let headers = lines.next().unwrap_or_default();
        Table {
            headers,
            rows: lines.collect(),
        }
    }

    /// `{"values": [[header...], [cell...], ...]}` as returned by the sheet values API.
    pub fn from_values(payload: &Value) -> Option<Self> {
        let rows = payload.get("values")?.as_array()?;
        let mut rows = rows.iter().map(|row| {
            row.as_array()
                .map(|cells| cells.iter().map(cell_text).collect::<Vec<_>>())
                .unwrap_or_default()
        });
        let headers = rows.next().unwrap_or_default();
        Some(Table {
            headers,
            rows: rows.collect(),
        })
    }
}

/// Render a JSON scalar as cell text. Nested values are kept as compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// `<unix millis>_<6 hex chars>`, for records that arrive without an id.
pub fn synthesize_id(now: DateTime<Utc>) -> String {
    let bytes: [u8; 3] = rand::rng().random();
    format!("{}_{}", now.timestamp_millis(), hex::encode(bytes))
}

/// Keep the first record for each request id.
pub fn dedupe_ids(records: Vec<MeetingRecord>) -> Vec<MeetingRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| {
            let fresh = seen.insert(r.request_id.clone());
            if !fresh {
                log::warn!("Dropping duplicate request id {}", r.request_id);
            }
            fresh
        })
        .collect()
}
