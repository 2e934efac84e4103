//! Attendance (check-in) records

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use gymtrack_core::{timestamp_string, Filter, FilterOp, QueryDescriptor};

use super::calendar::{Bounds, Month};
use super::user::{User, UserType};

/// Collection holding check-ins
pub const HISTORY: &str = "history";

/// Sort and range field of attendance records
pub const CREATED_AT: &str = "createdAt";

/// One check-in, denormalized from the member at check-in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub user_type: UserType,
    pub branch: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
}

impl AttendanceRecord {
    pub fn check_in(user: &User, branch: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            user_id: user.id.clone(),
            name: user.name.clone(),
            user_type: user.user_type,
            branch: branch.to_owned(),
            created_at: timestamp_string(now),
            department: user.department.clone(),
            student_code: user.student_code.clone(),
            program: user.program.clone(),
        }
    }

    /// Program for students, department for staff.
    pub fn affiliation(&self) -> Option<&str> {
        match self.user_type {
            UserType::Student => self.program.as_deref(),
            UserType::Staff => self.department.as_deref(),
        }
    }

    /// Check-in time rendered in `tz` with `format`; the raw value when unparsable.
    pub fn local_time(&self, tz: Tz, format: &str) -> String {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map(|at| at.with_timezone(&tz).format(format).to_string())
            .unwrap_or_else(|_| self.created_at.clone())
    }
}

/// Predicates finding a member's check-ins at a branch within `day`.
pub fn same_day_filters(user_id: &str, branch: &str, day: Bounds) -> Vec<Filter> {
    vec![
        Filter::eq("userId", user_id),
        Filter::eq("branch", branch),
        Filter::new(CREATED_AT, FilterOp::Ge, timestamp_string(day.start)),
        Filter::new(CREATED_AT, FilterOp::Le, timestamp_string(day.end)),
    ]
}

/// Dataset of one month of check-ins, most recent first.
pub fn month_descriptor(month: Month, tz: Tz, page_size: usize) -> QueryDescriptor {
    let bounds = month.bounds(tz);
    QueryDescriptor::new(HISTORY, CREATED_AT)
        .filter(Filter::new(CREATED_AT, FilterOp::Ge, timestamp_string(bounds.start)))
        .filter(Filter::new(CREATED_AT, FilterOp::Le, timestamp_string(bounds.end)))
        .page_size(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn staff() -> User {
        User {
            id: "u1".into(),
            name: "Luis".into(),
            document: "99".into(),
            email: "luis@example.edu".into(),
            user_type: UserType::Staff,
            student_code: None,
            program: None,
            department: Some("Library".into()),
            created_at: "2025-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn check_in_copies_member_details() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap();
        let record = AttendanceRecord::check_in(&staff(), "North Campus", now);

        assert_eq!(record.user_id, "u1");
        assert_eq!(record.branch, "North Campus");
        assert_eq!(record.created_at, "2025-03-10T14:30:00.000Z");
        assert_eq!(record.affiliation(), Some("Library"));
    }

    #[test]
    fn local_time_uses_timezone() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap();
        let record = AttendanceRecord::check_in(&staff(), "North Campus", now);
        assert_eq!(
            record.local_time(chrono_tz::America::Bogota, "%Y-%m-%d %H:%M"),
            "2025-03-10 09:30"
        );
    }

    #[test]
    fn month_descriptor_ranges_over_month() {
        let d = month_descriptor(Month::parse("2025-03").unwrap(), Tz::UTC, 20);
        assert_eq!(d.path, HISTORY);
        assert_eq!(d.order_field, CREATED_AT);
        assert_eq!(d.filters.len(), 2);
        assert_eq!(d.filters[0].value, serde_json::json!("2025-03-01T00:00:00.000Z"));
        assert_eq!(d.filters[1].value, serde_json::json!("2025-03-31T23:59:59.999Z"));
    }

    #[test]
    fn changing_month_changes_dataset_identity() {
        let march = month_descriptor(Month::parse("2025-03").unwrap(), Tz::UTC, 20);
        let april = month_descriptor(Month::parse("2025-04").unwrap(), Tz::UTC, 20);
        assert!(!march.same_dataset(&april));
        assert!(march.same_dataset(&month_descriptor(Month::parse("2025-03").unwrap(), Tz::UTC, 5)));
    }
}
