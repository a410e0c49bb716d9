use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::types::{Status, null_as_empty};
use crate::auth::validate::{parse_date, parse_time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Approve,
    Reject,
    Reschedule,
}

impl ActionKind {
    pub fn parse(value: &str) -> Option<ActionKind> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approve" => Some(ActionKind::Approve),
            "reject" => Some(ActionKind::Reject),
            "reschedule" => Some(ActionKind::Reschedule),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Approve => "approve",
            ActionKind::Reject => "reject",
            ActionKind::Reschedule => "reschedule",
        }
    }

    /// Status the request ends up in once the workflow applies the action.
    pub fn resulting_status(&self) -> Status {
        match self {
            ActionKind::Approve => Status::Approved,
            ActionKind::Reject => Status::Rejected,
            ActionKind::Reschedule => Status::Rescheduled,
        }
    }
}

/// Body of `POST /api/admin/meeting/action`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionForm {
    #[serde(deserialize_with = "null_as_empty")]
    pub request_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub action: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub admin_notes: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub new_date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub new_time: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub meeting_link: String,
    /// Any other fields are passed through to the workflow untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// An action that passed local checks and may be sent upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAction {
    pub request_id: String,
    pub kind: ActionKind,
    pub admin_notes: String,
    pub meeting_link: String,
    /// Only set for reschedules.
    pub new_slot: Option<NaiveDateTime>,
    pub extra: serde_json::Map<String, Value>,
}

impl ActionForm {
    /// Check the action against `now` (local wall-clock time of the admin).
    /// Reschedules need a date and time strictly in the future.
    pub fn validate(self, now: NaiveDateTime) -> Result<ValidatedAction, String> {
        let request_id = self.request_id.trim().to_string();
        if request_id.is_empty() {
            return Err("requestId is required".to_string());
        }
        let kind = ActionKind::parse(&self.action)
            .ok_or_else(|| format!("Unknown action '{}': expected approve, reject or reschedule", self.action.trim()))?;

        let new_slot = if kind == ActionKind::Reschedule {
            if self.new_date.trim().is_empty() || self.new_time.trim().is_empty() {
                return Err("newDate and newTime are required to reschedule".to_string());
            }
            let date = parse_date(&self.new_date).ok_or("newDate must be a date (YYYY-MM-DD)")?;
            let time = parse_time(&self.new_time).ok_or("newTime must be a time (HH:MM)")?;
            let slot = date.and_time(time);
            if slot <= now {
                return Err("The new meeting time must be in the future".to_string());
            }
            Some(slot)
        } else {
            None
        };

        Ok(ValidatedAction {
            request_id,
            kind,
            admin_notes: self.admin_notes.trim().to_string(),
            meeting_link: self.meeting_link.trim().to_string(),
            new_slot,
            extra: self.extra,
        })
    }
}

impl ValidatedAction {
    /// JSON sent to the action webhook.
    pub fn to_payload(&self, processed_by: &str) -> Value {
        let mut payload = self.extra.clone();
        let fields = json!({
            "requestId": self.request_id,
            "action": self.kind.as_str(),
            "status": self.kind.resulting_status().label(),
            "adminNotes": self.admin_notes,
            "meetingLink": self.meeting_link,
            "newDate": self.new_slot.map(|s| s.format("%Y-%m-%d").to_string()),
            "newTime": self.new_slot.map(|s| s.format("%H:%M").to_string()),
            "processedBy": processed_by,
            "processedAt": Utc::now().to_rfc3339(),
        });
        if let Value::Object(fields) = fields {
            payload.extend(fields);
        }
        Value::Object(payload)
    }
}
