//! Field-name aliasing between external sources and the canonical record.
//!
//! The lookup is data, not code: `ALIASES` lists every folded synonym once.
//! Folding lowercases and drops `_`, `-`, `.` and spaces, so `Request_ID`,
//! `request-id` and `requestId` all land on the same entry.

/// Canonical meeting record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    RequestId,
    Timestamp,
    CreatedDate,
    UpdatedDate,
    UserName,
    UserEmail,
    UserPhone,
    UserCompany,
    UserPosition,
    MeetingType,
    MeetingPurpose,
    MeetingDescription,
    PreferredDate,
    PreferredTime,
    EstimatedDuration,
    Location,
    Priority,
    Status,
    AdminNotes,
    AdditionalNotes,
    MeetingLink,
}

impl Field {
    /// Spreadsheet column order.
    pub const ALL: [Field; 21] = [
        Field::RequestId,
        Field::Timestamp,
        Field::UserName,
        Field::UserEmail,
        Field::UserPhone,
        Field::UserCompany,
        Field::UserPosition,
        Field::MeetingType,
        Field::MeetingPurpose,
        Field::MeetingDescription,
        Field::PreferredDate,
        Field::PreferredTime,
        Field::EstimatedDuration,
        Field::Location,
        Field::Priority,
        Field::Status,
        Field::AdminNotes,
        Field::AdditionalNotes,
        Field::MeetingLink,
        Field::CreatedDate,
        Field::UpdatedDate,
    ];

    /// camelCase name used in JSON.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Field::RequestId => "requestId",
            Field::Timestamp => "timestamp",
            Field::CreatedDate => "createdDate",
            Field::UpdatedDate => "updatedDate",
            Field::UserName => "userName",
            Field::UserEmail => "userEmail",
            Field::UserPhone => "userPhone",
            Field::UserCompany => "userCompany",
            Field::UserPosition => "userPosition",
            Field::MeetingType => "meetingType",
            Field::MeetingPurpose => "meetingPurpose",
            Field::MeetingDescription => "meetingDescription",
            Field::PreferredDate => "preferredDate",
            Field::PreferredTime => "preferredTime",
            Field::EstimatedDuration => "estimatedDuration",
            Field::Location => "location",
            Field::Priority => "priority",
            Field::Status => "status",
            Field::AdminNotes => "adminNotes",
            Field::AdditionalNotes => "additionalNotes",
            Field::MeetingLink => "meetingLink",
        }
    }

    /// Column header used by the spreadsheet store.
    pub fn sheet_header(self) -> &'static str {
        match self {
            Field::RequestId => "Request_ID",
            Field::Timestamp => "Timestamp",
            Field::CreatedDate => "Created_Date",
            Field::UpdatedDate => "Updated_Date",
            Field::UserName => "User_Name",
            Field::UserEmail => "User_Email",
            Field::UserPhone => "User_Phone",
            Field::UserCompany => "User_Company",
            Field::UserPosition => "User_Position",
            Field::MeetingType => "Meeting_Type",
            Field::MeetingPurpose => "Meeting_Purpose",
            Field::MeetingDescription => "Meeting_Description",
            Field::PreferredDate => "Preferred_Date",
            Field::PreferredTime => "Preferred_Time",
            Field::EstimatedDuration => "Estimated_Duration",
            Field::Location => "Location",
            Field::Priority => "Urgency",
            Field::Status => "Status",
            Field::AdminNotes => "Admin_Notes",
            Field::AdditionalNotes => "Additional_Notes",
            Field::MeetingLink => "Meeting_Link",
        }
    }
}

const ALIASES: &[(&str, Field)] = &[
    ("requestid", Field::RequestId),
    ("reqid", Field::RequestId),
    ("id", Field::RequestId),
    ("timestamp", Field::Timestamp),
    ("submittedat", Field::Timestamp),
    ("submissiontime", Field::Timestamp),
    ("createdat", Field::Timestamp),
    ("createddate", Field::CreatedDate),
    ("datecreated", Field::CreatedDate),
    ("updateddate", Field::UpdatedDate),
    ("updatedat", Field::UpdatedDate),
    ("lastmodified", Field::UpdatedDate),
    ("username", Field::UserName),
    ("name", Field::UserName),
    ("fullname", Field::UserName),
    ("requestername", Field::UserName),
    ("useremail", Field::UserEmail),
    ("email", Field::UserEmail),
    ("emailaddress", Field::UserEmail),
    ("userphone", Field::UserPhone),
    ("phone", Field::UserPhone),
    ("phonenumber", Field::UserPhone),
    ("usercompany", Field::UserCompany),
    ("company", Field::UserCompany),
    ("organization", Field::UserCompany),
    ("organisation", Field::UserCompany),
    ("userposition", Field::UserPosition),
    ("position", Field::UserPosition),
    ("jobtitle", Field::UserPosition),
    ("meetingtype", Field::MeetingType),
    ("type", Field::MeetingType),
    ("meetingpurpose", Field::MeetingPurpose),
    ("purpose", Field::MeetingPurpose),
    ("subject", Field::MeetingPurpose),
    ("topic", Field::MeetingPurpose),
    ("meetingdescription", Field::MeetingDescription),
    ("description", Field::MeetingDescription),
    ("details", Field::MeetingDescription),
    ("preferreddate", Field::PreferredDate),
    ("meetingdate", Field::PreferredDate),
    ("date", Field::PreferredDate),
    ("preferredtime", Field::PreferredTime),
    ("meetingtime", Field::PreferredTime),
    ("time", Field::PreferredTime),
    ("estimatedduration", Field::EstimatedDuration),
    ("duration", Field::EstimatedDuration),
    ("durationminutes", Field::EstimatedDuration),
    ("location", Field::Location),
    ("venue", Field::Location),
    ("place", Field::Location),
    ("priority", Field::Priority),
    ("urgency", Field::Priority),
    ("prioritylevel", Field::Priority),
    ("urgencylevel", Field::Priority),
    ("status", Field::Status),
    ("requeststatus", Field::Status),
    ("approvalstatus", Field::Status),
    ("adminnotes", Field::AdminNotes),
    ("adminnote", Field::AdminNotes),
    ("admincomment", Field::AdminNotes),
    ("additionalnotes", Field::AdditionalNotes),
    ("notes", Field::AdditionalNotes),
    ("remarks", Field::AdditionalNotes),
    ("meetinglink", Field::MeetingLink),
    ("joinurl", Field::MeetingLink),
    ("link", Field::MeetingLink),
];

/// Result of resolving an external name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKey {
    Known(Field),
    /// Unrecognized name, lowercased with underscores stripped.
    Other(String),
}

fn fold(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | '.' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Look up a folded name in the alias table.
pub fn lookup(name: &str) -> Option<Field> {
    let folded = fold(name.trim());
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, field)| *field)
}

/// Resolve an external field name. Blank names resolve to None.
pub fn resolve(name: &str) -> Option<FieldKey> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match lookup(trimmed) {
        Some(field) => FieldKey::Known(field),
        None => FieldKey::Other(trimmed.to_lowercase().replace('_', "")),
    })
}
