use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    models::{DayActivity, GradeBucket, ProgressionPoint},
    window::{DateWindow, Period},
};
use crate::{config::offset_from_minutes, grades::ClimbingType, shared::AppError};

/// Query parameters shared by the windowed stats endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub period: Period,
    /// Day the week/month/year window is built around; defaults to today
    pub anchor: Option<NaiveDate>,
    /// Inclusive first day of a custom window
    pub start: Option<NaiveDate>,
    /// Exclusive last day of a custom window
    pub end: Option<NaiveDate>,
    pub tz_offset_minutes: Option<i32>,
    pub climbing_type: Option<ClimbingType>,
}

impl StatsQuery {
    pub fn offset(&self, default_minutes: i32) -> FixedOffset {
        offset_from_minutes(self.tz_offset_minutes.unwrap_or(default_minutes))
    }

    pub fn climbing_type(&self) -> ClimbingType {
        self.climbing_type.unwrap_or_default()
    }

    /// Resolves the requested window in `tz`, using `now` for the default anchor
    pub fn window(&self, now: DateTime<Utc>, tz: &FixedOffset) -> Result<DateWindow, AppError> {
        let anchor = self
            .anchor
            .unwrap_or_else(|| now.with_timezone(tz).date_naive());

        let named = DateWindow::for_period(self.period, anchor, tz)
            .map_err(|error| AppError::BadRequest(error.to_string()))?;
        if let Some(window) = named {
            return Ok(window);
        }

        match (self.start, self.end) {
            (Some(start), Some(end)) if start < end => Ok(DateWindow::custom(start, end, tz)),
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "Custom window start must be before end".to_string(),
            )),
            _ => Err(AppError::BadRequest(
                "Custom window needs both start and end".to_string(),
            )),
        }
    }
}

/// Query parameters for the calendar heatmap
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub tz_offset_minutes: Option<i32>,
}

impl CalendarQuery {
    /// Requested year and month, defaulting to the current local month
    pub fn year_month(
        &self,
        now: DateTime<Utc>,
        tz: &FixedOffset,
    ) -> Result<(i32, u32), AppError> {
        let today = now.with_timezone(tz).date_naive();
        let month = self.month.unwrap_or_else(|| today.month());
        if !(1..=12).contains(&month) {
            return Err(AppError::BadRequest(format!("Invalid month: {}", month)));
        }
        Ok((self.year.unwrap_or_else(|| today.year()), month))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressionResponse {
    pub climbing_type: ClimbingType,
    pub points: Vec<ProgressionPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DistributionResponse {
    pub climbing_type: ClimbingType,
    pub buckets: Vec<GradeBucket>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayActivity>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub logged_today: bool,
}
