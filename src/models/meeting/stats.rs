use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use super::types::{MeetingRecord, MeetingType, Priority, Status};

const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub low: usize,
    pub normal: usize,
    pub medium: usize,
    pub high: usize,
    pub urgent: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub online: usize,
    pub offline: usize,
    pub hybrid: usize,
}

/// Counters shown above the admin table. Derived, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_count: usize,
    pub pending_count: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub rescheduled_count: usize,
    pub by_priority: PriorityCounts,
    pub by_type: TypeCounts,
    /// Requests submitted in the trailing seven days.
    pub this_week_count: usize,
    /// True when total/pending/approved came from the workflow's own figures.
    pub external_totals: bool,
}

impl Statistics {
    /// Count a record list. Unknown priority/type values count toward the total only.
    pub fn compute(records: &[MeetingRecord], now: DateTime<Utc>) -> Self {
        let mut stats = Statistics {
            total_count: records.len(),
            ..Default::default()
        };
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

        for record in records {
            match record.status {
                Status::Pending => stats.pending_count += 1,
                Status::Approved => stats.approved_count += 1,
                Status::Rejected => stats.rejected_count += 1,
                Status::Rescheduled => stats.rescheduled_count += 1,
            }

            match record.priority_level() {
                Some(Priority::Low) => stats.by_priority.low += 1,
                Some(Priority::Normal) => stats.by_priority.normal += 1,
                Some(Priority::Medium) => stats.by_priority.medium += 1,
                Some(Priority::High) => stats.by_priority.high += 1,
                Some(Priority::Urgent) => stats.by_priority.urgent += 1,
                None => {}
            }

            match record.kind() {
                Some(MeetingType::Online) => stats.by_type.online += 1,
                Some(MeetingType::Offline) => stats.by_type.offline += 1,
                Some(MeetingType::Hybrid) => stats.by_type.hybrid += 1,
                None => {}
            }

            if record.submitted_at().is_some_and(|ts| ts >= cutoff) {
                stats.this_week_count += 1;
            }
        }
        stats
    }

    /// Local counts, with total/pending/approved replaced by the workflow's
    /// `totalCount`/`pendingCount`/`approvedCount` when it sent them.
    /// The weekly count is always local.
    pub fn reconcile(records: &[MeetingRecord], external: Option<&Value>, now: DateTime<Utc>) -> Self {
        let mut stats = Self::compute(records, now);
        let Some(Value::Object(map)) = external else {
            return stats;
        };

        let mut overridden = false;
        for (key, slot) in [
            ("totalCount", &mut stats.total_count),
            ("pendingCount", &mut stats.pending_count),
            ("approvedCount", &mut stats.approved_count),
        ] {
            if let Some(n) = map.get(key).and_then(count_value) {
                *slot = n;
                overridden = true;
            }
        }
        stats.external_totals = overridden;
        stats
    }
}

/// Accept non-negative integers given as numbers or numeric strings.
fn count_value(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
