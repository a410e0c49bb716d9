//! Locating meeting records inside webhook replies of unknown shape.
//!
//! The workflow's reply layout depends on how its last node is configured,
//! so extraction is an ordered list of matchers over the parsed JSON; the
//! first that recognises the payload wins. Normalization is total: anything
//! unrecognised becomes an empty list with a diagnostic message.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::{cell_text, dedupe_ids, synthesize_id};
use crate::models::meeting::aliases::{self, Field};
use crate::models::meeting::MeetingRecord;

/// How deep `{"json": {...}}` wrappers are followed.
const MAX_JSON_DEPTH: usize = 4;

/// Array properties tried after `meetings` and `data`, in order.
const GENERIC_ENVELOPES: [&str; 3] = ["items", "response", "result"];

/// Keys that mark an array element as meeting-like during auto-detection.
const RECORD_MARKERS: [Field; 3] = [Field::RequestId, Field::UserName, Field::MeetingPurpose];

/// Which structure the records were found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    BareArray,
    Envelope(&'static str),
    SingleRecord,
    Detected(String),
    Unmatched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub records: Vec<MeetingRecord>,
    pub statistics: Option<Value>,
    pub last_updated: Option<String>,
    pub message: Option<String>,
    pub shape: Shape,
}

struct Extraction<'a> {
    items: Vec<&'a Value>,
    shape: Shape,
    statistics: Option<&'a Value>,
    last_updated: Option<&'a Value>,
    message: Option<&'a Value>,
}

impl<'a> Extraction<'a> {
    fn new(items: Vec<&'a Value>, shape: Shape) -> Self {
        Extraction {
            items,
            shape,
            statistics: None,
            last_updated: None,
            message: None,
        }
    }
}

type Matcher = for<'a> fn(&'a Value) -> Option<Extraction<'a>>;

/// Object matchers in priority order (after the `json` descent).
const MATCHERS: [Matcher; 4] = [meetings_envelope, data_envelope, generic_envelope, single_record];

pub fn normalize(payload: &Value) -> Normalized {
    normalize_at(payload, Utc::now())
}

pub fn normalize_at(payload: &Value, now: DateTime<Utc>) -> Normalized {
    let extraction = extract(payload, 0).or_else(|| match payload {
        Value::Object(map) => detect_array(map),
        _ => None,
    });

    let Some(extraction) = extraction else {
        let upstream_message = payload.get("message").and_then(Value::as_str);
        log::warn!("Webhook reply matched no known shape");
        return Normalized {
            records: Vec::new(),
            statistics: None,
            last_updated: None,
            message: Some(match upstream_message {
                Some(msg) => format!("No meeting records in workflow response ({msg})"),
                None => "No meeting records in workflow response".to_string(),
            }),
            shape: Shape::Unmatched,
        };
    };

    let total = extraction.items.len();
    let records: Vec<MeetingRecord> = extraction
        .items
        .iter()
        .filter_map(|item| record_from_value(item))
        .map(|mut record| {
            record.apply_defaults(|| synthesize_id(now), now);
            record
        })
        .filter(MeetingRecord::is_valid)
        .collect();
    if records.len() < total {
        log::info!(
            "Normalizer kept {} of {} items from {:?}",
            records.len(),
            total,
            extraction.shape
        );
    }

    Normalized {
        records: dedupe_ids(records),
        statistics: extraction.statistics.filter(|s| s.is_object()).cloned(),
        last_updated: extraction.last_updated.map(cell_text).filter(|s| !s.is_empty()),
        message: extraction.message.and_then(Value::as_str).map(str::to_string),
        shape: extraction.shape,
    }
}

/// Resolution steps 1–6: bare array, `json` descent, envelopes, single record.
fn extract(value: &Value, depth: usize) -> Option<Extraction<'_>> {
    match value {
        Value::Array(items) => Some(bare_array(items, depth)),
        Value::Object(map) => {
            if depth < MAX_JSON_DEPTH {
                if let Some(nested @ Value::Object(_)) = map.get("json") {
                    if let Some(found) = extract(nested, depth + 1) {
                        return Some(found);
                    }
                }
            }
            MATCHERS.iter().find_map(|matcher| matcher(value))
        }
        _ => None,
    }
}

/// A bare array is the record list, except that a lone non-record element
/// carrying an envelope (`[{"meetings": [...]}]`) is unwrapped.
fn bare_array(items: &[Value], depth: usize) -> Extraction<'_> {
    if let [only @ Value::Object(map)] = items {
        if !looks_like_record(map) && depth < MAX_JSON_DEPTH {
            if let Some(found) = extract(only, depth + 1) {
                return found;
            }
        }
    }
    Extraction::new(items.iter().collect(), Shape::BareArray)
}

fn meetings_envelope(value: &Value) -> Option<Extraction<'_>> {
    let items = value.get("meetings")?.as_array()?;
    Some(Extraction {
        statistics: value.get("statistics"),
        last_updated: value.get("lastUpdated"),
        message: value.get("message"),
        ..Extraction::new(items.iter().collect(), Shape::Envelope("meetings"))
    })
}

fn data_envelope(value: &Value) -> Option<Extraction<'_>> {
    let items = value.get("data")?.as_array()?;
    Some(Extraction {
        statistics: value.get("statistics"),
        message: value.get("message"),
        ..Extraction::new(items.iter().collect(), Shape::Envelope("data"))
    })
}

fn generic_envelope(value: &Value) -> Option<Extraction<'_>> {
    GENERIC_ENVELOPES.iter().find_map(|key| {
        let items = value.get(*key)?.as_array()?;
        Some(Extraction::new(items.iter().collect(), Shape::Envelope(*key)))
    })
}

fn single_record(value: &Value) -> Option<Extraction<'_>> {
    let has_id = value
        .as_object()?
        .keys()
        .any(|k| aliases::lookup(k) == Some(Field::RequestId));
    has_id.then(|| Extraction::new(vec![value], Shape::SingleRecord))
}

/// Step 7: first array property whose first element has a record marker.
fn detect_array(map: &Map<String, Value>) -> Option<Extraction<'_>> {
    map.iter().find_map(|(key, value)| {
        let items = value.as_array()?;
        let Value::Object(first) = items.first()? else {
            return None;
        };
        looks_like_record(first)
            .then(|| Extraction::new(items.iter().collect(), Shape::Detected(key.clone())))
    })
}

fn looks_like_record(map: &Map<String, Value>) -> bool {
    map.keys()
        .any(|k| aliases::lookup(k).is_some_and(|f| RECORD_MARKERS.contains(&f) && is_marker_name(k, f)))
}

/// Markers must be the field's own name, not a loose synonym like `name` or `id`.
fn is_marker_name(key: &str, field: Field) -> bool {
    let folded: String = key
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    folded == field.canonical_name().to_lowercase()
}

/// Build a record from one array element. Non-objects are skipped and an
/// n8n item wrapper (`{"json": {...}, "pairedItem": ...}`) is unwrapped
/// unless the outer object is itself record-like.
fn record_from_value(value: &Value) -> Option<MeetingRecord> {
    let map = match value {
        Value::Object(map) => match map.get("json") {
            Some(Value::Object(inner)) if !looks_like_record(map) => inner,
            _ => map,
        },
        _ => return None,
    };
    Some(record_from_object(map))
}

/// Map every property through the aliaser. Exact canonical names are applied
/// last so they win over looser synonyms of the same field.
pub fn record_from_object(map: &Map<String, Value>) -> MeetingRecord {
    let mut record = MeetingRecord::default();
    let mut exact = Vec::new();
    for (key, value) in map {
        let Some(field_key) = aliases::resolve(key) else { continue };
        let is_exact = matches!(field_key, aliases::FieldKey::Known(f) if f.canonical_name() == key.as_str());
        if is_exact {
            exact.push((field_key, value));
        } else {
            record.set(&field_key, cell_text(value));
        }
    }
    for (field_key, value) in exact {
        record.set(&field_key, cell_text(value));
    }
    record
}
