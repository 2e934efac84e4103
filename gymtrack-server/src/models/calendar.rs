//! Day and month boundaries in the gym's timezone

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::ValidationError;

/// Inclusive UTC range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// First instant of `date` in `tz`, as UTC.
fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST jump: the day starts at the first valid instant after it.
        None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}

/// Start and end (inclusive, millisecond precision) of the local day containing `now`.
pub fn day_bounds(now: DateTime<Utc>, tz: Tz) -> Bounds {
    let today = now.with_timezone(&tz).date_naive();
    let start = local_midnight(tz, today);
    let end = today
        .succ_opt()
        .map(|tomorrow| local_midnight(tz, tomorrow) - Duration::milliseconds(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    Bounds { start, end }
}

/// A calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or(ValidationError::InvalidFormat {
                field: "month",
                reason: "must be a valid YYYY-MM month",
            })
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = ValidationError::InvalidFormat {
            field: "month",
            reason: "must be formatted as YYYY-MM",
        };
        let (year, month) = s.trim().split_once('-').ok_or(invalid.clone())?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid);
        }
        let year = year.parse::<i32>().map_err(|_| invalid.clone())?;
        let month = month.parse::<u32>().map_err(|_| invalid)?;
        Self::new(year, month)
    }

    /// Month containing `now` in `tz`.
    pub fn containing(now: DateTime<Utc>, tz: Tz) -> Self {
        let local = now.with_timezone(&tz);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Start of the month through its last millisecond, in `tz`, as UTC.
    pub fn bounds(&self, tz: Tz) -> Bounds {
        Bounds {
            start: local_midnight(tz, self.first_day()),
            end: local_midnight(tz, self.next().first_day()) - Duration::milliseconds(1),
        }
    }

    /// Human label, e.g. "March 2025".
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    /// This month and the `count - 1` months before it, newest first.
    pub fn recent(self, count: usize) -> Vec<Self> {
        std::iter::successors(Some(self), |m| Some(m.previous()))
            .take(count)
            .collect()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Month option offered to history filters
#[derive(Debug, Clone, Serialize)]
pub struct MonthOption {
    pub value: String,
    pub label: String,
}

impl From<Month> for MonthOption {
    fn from(m: Month) -> Self {
        Self {
            value: m.to_string(),
            label: m.label(),
        }
    }
}
