use chrono::{DateTime, Datelike, Duration, IsoWeek, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// ISO 8601 year/week pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    /// Returns `None` when the week does not exist in that ISO year
    pub fn new(year: i32, week: u32) -> Option<Self> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).map(|_| Self { year, week })
    }

    pub fn containing(ts: &DateTime<Utc>) -> Self {
        Self::from(ts.date_naive().iso_week())
    }

    /// Half-open UTC range `[monday 00:00, next monday 00:00)`
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let monday = NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)?;
        let start = monday.and_hms_opt(0, 0, 0)?.and_utc();
        Some((start, start + Duration::days(7)))
    }
}

impl From<IsoWeek> for WeekKey {
    fn from(week: IsoWeek) -> Self {
        Self {
            year: week.year(),
            week: week.week(),
        }
    }
}

/// Structured payload stored alongside the aggregate columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryData {
    /// Sorted, distinct
    pub branches_worked_on: Vec<String>,
    pub unique_sessions: u64,
    pub average_session_time: f64,
}

/// Weekly rollup for one (year, week, tool, project path)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub year: i32,
    pub week_number: u32,
    pub cli_tool: String,
    pub project_path: String,
    pub session_count: u64,
    pub total_time_seconds: f64,
    pub summary_data: SummaryData,
}
