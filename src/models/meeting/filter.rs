use std::cmp::Ordering;

use serde::Deserialize;

use super::types::{MeetingRecord, MeetingType, Priority, Status};

/// Query string accepted by the admin list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
}

/// In-memory view filter over the fetched list. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeetingFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub meeting_type: Option<MeetingType>,
    pub search: Option<String>,
}

impl MeetingFilter {
    /// Blank, `all` and unrecognized values leave that dimension unfiltered.
    pub fn from_query(query: &ListQuery) -> Self {
        let pick = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
                .map(str::to_string)
        };
        MeetingFilter {
            status: pick(&query.status).and_then(|s| Status::parse(&s)),
            priority: pick(&query.priority).and_then(|s| Priority::parse(&s)),
            meeting_type: pick(&query.meeting_type).and_then(|s| MeetingType::parse(&s)),
            search: pick(&query.search).map(|s| s.to_lowercase()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.meeting_type.is_none() && self.search.is_none()
    }

    pub fn matches(&self, record: &MeetingRecord) -> bool {
        if self.status.is_some_and(|s| s != record.status) {
            return false;
        }
        if self.priority.is_some() && self.priority != record.priority_level() {
            return false;
        }
        if self.meeting_type.is_some() && self.meeting_type != record.kind() {
            return false;
        }
        match &self.search {
            None => true,
            Some(needle) => [
                &record.request_id,
                &record.user_name,
                &record.user_email,
                &record.user_company,
                &record.meeting_purpose,
            ]
            .iter()
            .any(|hay| hay.to_lowercase().contains(needle.as_str())),
        }
    }

    pub fn apply(&self, records: &[MeetingRecord]) -> Vec<MeetingRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum SortColumn {
    #[default]
    Timestamp,
    PreferredDate,
    UserName,
    Status,
    Priority,
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Timestamp => "timestamp",
            SortColumn::PreferredDate => "preferredDate",
            SortColumn::UserName => "userName",
            SortColumn::Status => "status",
            SortColumn::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub dir: SortDir,
}

impl SortSpec {
    /// Newest submissions first unless asked otherwise.
    pub fn from_params(sort: Option<&str>, dir: Option<&str>) -> Self {
        let column = match sort.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("preferreddate" | "preferred_date" | "date") => SortColumn::PreferredDate,
            Some("username" | "user_name" | "name") => SortColumn::UserName,
            Some("status") => SortColumn::Status,
            Some("priority" | "urgency") => SortColumn::Priority,
            _ => SortColumn::Timestamp,
        };
        SortSpec {
            column,
            dir: if dir == Some("asc") { SortDir::Asc } else { SortDir::Desc },
        }
    }

    pub fn dir_str(&self) -> &'static str {
        match self.dir {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    /// Stable sort, so records that compare equal keep their source order.
    pub fn sort(&self, records: &mut [MeetingRecord]) {
        records.sort_by(|a, b| {
            let ord = self.compare(a, b);
            match self.dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        });
    }

    fn compare(&self, a: &MeetingRecord, b: &MeetingRecord) -> Ordering {
        match self.column {
            SortColumn::Timestamp => a.submitted_at().cmp(&b.submitted_at()),
            SortColumn::PreferredDate => (&a.preferred_date, &a.preferred_time)
                .cmp(&(&b.preferred_date, &b.preferred_time)),
            SortColumn::UserName => a.user_name.to_lowercase().cmp(&b.user_name.to_lowercase()),
            SortColumn::Status => a.status.as_str().cmp(b.status.as_str()),
            SortColumn::Priority => a.priority_level().cmp(&b.priority_level()),
        }
    }
}
