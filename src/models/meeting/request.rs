use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;

use super::types::{MeetingRecord, MeetingType, Priority, Status, null_as_empty};
use crate::auth::validate::{
    validate_date, validate_email, validate_optional, validate_phone, validate_required, validate_time,
};

/// Body of `POST /api/meeting/request`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewMeetingRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub user_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub user_email: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub user_phone: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub user_company: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub user_position: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub meeting_type: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub meeting_purpose: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub meeting_description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub preferred_date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub preferred_time: String,
    pub estimated_duration: Option<serde_json::Value>,
    #[serde(deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(alias = "urgency", deserialize_with = "null_as_empty")]
    pub priority: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub additional_notes: String,
}

impl NewMeetingRequest {
    /// Collect every field problem at once, so the form can flag them together.
    pub fn validate(&self) -> Vec<String> {
        let mut errors: Vec<String> = [
            validate_required(&self.user_name, "userName", 100),
            validate_email(&self.user_email),
            validate_phone(&self.user_phone),
            validate_optional(&self.user_company, "userCompany", 150),
            validate_optional(&self.user_position, "userPosition", 100),
            validate_required(&self.meeting_purpose, "meetingPurpose", 200),
            validate_optional(&self.meeting_description, "meetingDescription", 2000),
            validate_date(&self.preferred_date, "preferredDate"),
            validate_time(&self.preferred_time, "preferredTime"),
            validate_optional(&self.location, "location", 300),
            validate_optional(&self.additional_notes, "additionalNotes", 2000),
        ]
        .into_iter()
        .flatten()
        .collect();

        match MeetingType::parse(&self.meeting_type) {
            None => errors.push("meetingType must be one of online, offline, hybrid".to_string()),
            Some(kind) if kind.needs_location() && self.location.trim().is_empty() => {
                errors.push(format!("location is required for {} meetings", kind.as_str()));
            }
            Some(_) => {}
        }

        if !self.priority.trim().is_empty() && Priority::parse(&self.priority).is_none() {
            errors.push("priority must be one of low, normal, medium, high, urgent".to_string());
        }

        if let Some(duration) = &self.estimated_duration {
            let minutes = match duration {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) if s.trim().is_empty() => Some(60),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                serde_json::Value::Null => Some(60),
                _ => None,
            };
            if !minutes.is_some_and(|m| (5..=480).contains(&m)) {
                errors.push("estimatedDuration must be between 5 and 480 minutes".to_string());
            }
        }
        errors
    }

    /// Canonical record for a validated submission.
    pub fn into_record(self, request_id: String, now: DateTime<Utc>) -> MeetingRecord {
        let estimated_duration = match self.estimated_duration {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => "60".to_string(),
        };
        let priority = Priority::parse(&self.priority).unwrap_or(Priority::Normal);
        let meeting_type = MeetingType::parse(&self.meeting_type).map(|t| t.as_str()).unwrap_or_default();
        let timestamp = now.to_rfc3339();

        MeetingRecord {
            request_id,
            created_date: timestamp.clone(),
            timestamp,
            user_name: self.user_name.trim().to_string(),
            user_email: self.user_email.trim().to_lowercase(),
            user_phone: self.user_phone.trim().to_string(),
            user_company: self.user_company.trim().to_string(),
            user_position: self.user_position.trim().to_string(),
            meeting_type: meeting_type.to_string(),
            meeting_purpose: self.meeting_purpose.trim().to_string(),
            meeting_description: self.meeting_description.trim().to_string(),
            preferred_date: self.preferred_date.trim().to_string(),
            preferred_time: self.preferred_time.trim().to_string(),
            estimated_duration,
            location: self.location.trim().to_string(),
            priority: priority.as_str().to_string(),
            status: Status::Pending,
            additional_notes: self.additional_notes.trim().to_string(),
            ..Default::default()
        }
    }
}

/// `REQ-<yyyymmddHHMMSS>-<6 hex>` for requests submitted through the form.
pub fn new_request_id(now: DateTime<Utc>) -> String {
    let bytes: [u8; 3] = rand::rng().random();
    format!("REQ-{}-{}", now.format("%Y%m%d%H%M%S"), hex::encode(bytes).to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid() -> NewMeetingRequest {
        NewMeetingRequest {
            user_name: "Ann Lee".into(),
            user_email: "Ann@Example.com".into(),
            user_phone: "+1 555 123 4567".into(),
            meeting_type: "Online".into(),
            meeting_purpose: "Product demo".into(),
            preferred_date: "2026-04-01".into(),
            preferred_time: "10:00".into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid().validate().is_empty());
    }

    #[test]
    fn offline_needs_location() {
        let mut req = valid();
        req.meeting_type = "offline".into();
        assert_eq!(req.validate(), vec!["location is required for offline meetings".to_string()]);
        req.location = "HQ, room 4".into();
        assert!(req.validate().is_empty());
    }

    #[test]
    fn reports_every_bad_field() {
        let req = NewMeetingRequest {
            meeting_type: "teleport".into(),
            priority: "yesterday".into(),
            estimated_duration: Some(serde_json::json!(1000)),
            ..Default::default()
        };
        let errors = req.validate();
        for needle in ["userName", "userEmail", "userPhone", "meetingPurpose", "preferredDate", "preferredTime", "meetingType", "priority", "estimatedDuration"] {
            assert!(errors.iter().any(|e| e.starts_with(needle)), "missing {needle}: {errors:?}");
        }
    }

    #[test]
    fn urgency_alias_is_accepted() {
        let req: NewMeetingRequest = serde_json::from_value(serde_json::json!({
            "userName": "Ann", "urgency": "URGENT", "estimatedDuration": "30"
        }))
        .unwrap();
        assert_eq!(req.priority, "URGENT");
        let record = req.into_record("REQ-1".into(), Utc::now());
        assert_eq!(record.priority, "urgent");
        assert_eq!(record.estimated_duration, "30");
    }

    #[test]
    fn null_optional_fields_read_as_empty() {
        let req: NewMeetingRequest = serde_json::from_value(serde_json::json!({
            "userName": "Ann Lee", "userEmail": "ann@example.com", "userPhone": "+1 555 123 4567",
            "meetingType": "online", "meetingPurpose": "Demo",
            "preferredDate": "2026-04-01", "preferredTime": "10:00",
            "userCompany": null, "location": null, "urgency": null, "estimatedDuration": null
        }))
        .unwrap();
        assert_eq!(req.user_company, "");
        assert_eq!(req.location, "");
        assert!(req.validate().is_empty());
    }

    #[test]
    fn record_is_pending_and_normalized() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let record = valid().into_record(new_request_id(now), now);
        assert!(record.request_id.starts_with("REQ-20260301080000-"));
        assert_eq!(record.status, Status::Pending);
        assert_eq!(record.user_email, "ann@example.com");
        assert_eq!(record.meeting_type, "online");
        assert_eq!(record.priority, "normal");
        assert_eq!(record.estimated_duration, "60");
        assert_eq!(record.timestamp, now.to_rfc3339());
        assert!(record.is_valid());
    }
}
