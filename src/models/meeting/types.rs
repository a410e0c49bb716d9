use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::aliases::{Field, FieldKey};

/// Review state of a request. Unknown or blank source values read as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Status {
    #[default]
    Pending,
    Approved,
    Rejected,
    Rescheduled,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::Approved,
        Status::Rejected,
        Status::Rescheduled,
    ];

    /// Case-insensitive parse of a known status word. Returns None for anything else.
    pub fn parse(value: &str) -> Option<Status> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" | "new" | "waiting" => Some(Status::Pending),
            "approved" | "approve" | "confirmed" => Some(Status::Approved),
            "rejected" | "reject" | "declined" => Some(Status::Rejected),
            "rescheduled" | "reschedule" => Some(Status::Rescheduled),
            _ => None,
        }
    }

    pub fn from_source(value: &str) -> Status {
        Status::parse(value).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
            Status::Rescheduled => "rescheduled",
        }
    }

    /// Title-case form, as written to the spreadsheet.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Approved => "Approved",
            Status::Rejected => "Rejected",
            Status::Rescheduled => "Rescheduled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingType {
    Online,
    Offline,
    Hybrid,
}

impl MeetingType {
    pub fn parse(value: &str) -> Option<MeetingType> {
        match value.trim().to_ascii_lowercase().as_str() {
            "online" | "virtual" => Some(MeetingType::Online),
            "offline" | "onsite" | "on-site" | "in-person" | "in person" => Some(MeetingType::Offline),
            "hybrid" => Some(MeetingType::Hybrid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::Online => "online",
            MeetingType::Offline => "offline",
            MeetingType::Hybrid => "hybrid",
        }
    }

    /// Offline and hybrid meetings need a physical location.
    pub fn needs_location(&self) -> bool {
        !matches!(self, MeetingType::Online)
    }
}

/// Urgency levels. Sources use either the low/normal/high/urgent or the
/// low/medium/high vocabulary, so both are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn parse(value: &str) -> Option<Priority> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "normal" => Some(Priority::Normal),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// Canonical meeting request, whatever source it was read from.
///
/// Enum-like fields other than `status` keep the source text so unknown
/// vocabularies survive a round trip; typed views are available through
/// [`MeetingRecord::kind`] and [`MeetingRecord::priority_level`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    pub request_id: String,
    pub timestamp: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_company: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_position: String,
    pub meeting_type: String,
    pub meeting_purpose: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub meeting_description: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub estimated_duration: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub location: String,
    pub priority: String,
    pub status: Status,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub admin_notes: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub additional_notes: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub meeting_link: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated_date: String,
    /// Columns/properties with no canonical meaning, keyed by their normalized name.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl MeetingRecord {
    /// Store a value under a resolved key. Later writes to the same key win.
    pub fn set(&mut self, key: &FieldKey, value: String) {
        let field = match key {
            FieldKey::Known(field) => *field,
            FieldKey::Other(name) => {
                self.extra.insert(name.clone(), value);
                return;
            }
        };
        let slot = match field {
            Field::RequestId => &mut self.request_id,
            Field::Timestamp => &mut self.timestamp,
            Field::CreatedDate => &mut self.created_date,
            Field::UpdatedDate => &mut self.updated_date,
            Field::UserName => &mut self.user_name,
            Field::UserEmail => &mut self.user_email,
            Field::UserPhone => &mut self.user_phone,
            Field::UserCompany => &mut self.user_company,
            Field::UserPosition => &mut self.user_position,
            Field::MeetingType => &mut self.meeting_type,
            Field::MeetingPurpose => &mut self.meeting_purpose,
            Field::MeetingDescription => &mut self.meeting_description,
            Field::PreferredDate => &mut self.preferred_date,
            Field::PreferredTime => &mut self.preferred_time,
            Field::EstimatedDuration => &mut self.estimated_duration,
            Field::Location => &mut self.location,
            Field::Priority => &mut self.priority,
            Field::AdminNotes => &mut self.admin_notes,
            Field::AdditionalNotes => &mut self.additional_notes,
            Field::MeetingLink => &mut self.meeting_link,
            Field::Status => {
                self.status = Status::from_source(&value);
                return;
            }
        };
        *slot = value.trim().to_string();
    }

    /// Read a canonical field back as text (used for CSV export and search).
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::RequestId => &self.request_id,
            Field::Timestamp => &self.timestamp,
            Field::CreatedDate => &self.created_date,
            Field::UpdatedDate => &self.updated_date,
            Field::UserName => &self.user_name,
            Field::UserEmail => &self.user_email,
            Field::UserPhone => &self.user_phone,
            Field::UserCompany => &self.user_company,
            Field::UserPosition => &self.user_position,
            Field::MeetingType => &self.meeting_type,
            Field::MeetingPurpose => &self.meeting_purpose,
            Field::MeetingDescription => &self.meeting_description,
            Field::PreferredDate => &self.preferred_date,
            Field::PreferredTime => &self.preferred_time,
            Field::EstimatedDuration => &self.estimated_duration,
            Field::Location => &self.location,
            Field::Priority => &self.priority,
            Field::Status => self.status.label(),
            Field::AdminNotes => &self.admin_notes,
            Field::AdditionalNotes => &self.additional_notes,
            Field::MeetingLink => &self.meeting_link,
        }
    }

    /// Name, email and purpose must all be non-blank.
    pub fn is_valid(&self) -> bool {
        !self.user_name.trim().is_empty()
            && !self.user_email.trim().is_empty()
            && !self.meeting_purpose.trim().is_empty()
    }

    /// True when every canonical and extra value is blank.
    pub fn is_blank(&self) -> bool {
        Field::ALL
            .iter()
            .filter(|f| **f != Field::Status)
            .all(|f| self.get(*f).trim().is_empty())
            && self.extra.values().all(|v| v.trim().is_empty())
    }

    /// Fill the defaults every source shares: request id, then timestamp.
    pub fn apply_defaults(&mut self, fallback_id: impl FnOnce() -> String, now: DateTime<Utc>) {
        if self.request_id.is_empty() {
            self.request_id = fallback_id();
        }
        if self.timestamp.is_empty() {
            self.timestamp = if self.created_date.is_empty() {
                now.to_rfc3339()
            } else {
                self.created_date.clone()
            };
        }
    }

    pub fn kind(&self) -> Option<MeetingType> {
        MeetingType::parse(&self.meeting_type)
    }

    pub fn priority_level(&self) -> Option<Priority> {
        Priority::parse(&self.priority)
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Parse the timestamp formats seen in practice: RFC 3339, ISO without
/// offset, the spreadsheet's `M/D/YYYY H:MM:SS` and a bare date.
/// Offset-less values are read as UTC.
/// Read an optional text field from a form body, treating `null` as empty.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
