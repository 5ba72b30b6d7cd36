use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::aggregator::filter_by_date_range;
use crate::session::models::SessionRecord;

/// Named aggregation period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Year,
    #[default]
    All,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("No {0:?} window can be built around {1}")]
    OutOfRange(Period, NaiveDate),
}

/// Half-open interval of instants, `start <= t < end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Instant at which `day` starts in `tz`
///
/// Falls back to the first valid local time when midnight is skipped by a transition.
fn start_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|hours| {
            tz.from_local_datetime(&(midnight + Duration::hours(hours)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn all_time() -> Self {
        Self::new(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
    }

    /// Monday-to-Monday week containing `day`
    pub fn week_containing<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Result<Self, WindowError> {
        let out_of_range = || WindowError::OutOfRange(Period::Week, day);
        let monday = day
            .checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
            .ok_or_else(out_of_range)?;
        let next = monday
            .checked_add_days(Days::new(7))
            .ok_or_else(out_of_range)?;
        Ok(Self::custom(monday, next, tz))
    }

    pub fn month_containing<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Result<Self, WindowError> {
        let first = first_of_month(day);
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or(WindowError::OutOfRange(Period::Month, day))?;
        Ok(Self::custom(first, next, tz))
    }

    pub fn year_containing<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Result<Self, WindowError> {
        let first = day.with_ordinal(1).unwrap_or(day);
        let next = first
            .checked_add_months(Months::new(12))
            .ok_or(WindowError::OutOfRange(Period::Year, day))?;
        Ok(Self::custom(first, next, tz))
    }

    /// From the start of `start_day` up to, not including, the start of `end_day`
    pub fn custom<Tz: TimeZone>(start_day: NaiveDate, end_day: NaiveDate, tz: &Tz) -> Self {
        Self::new(start_of_day(start_day, tz), start_of_day(end_day, tz))
    }

    /// Window for a named period around `anchor`; `Custom` needs explicit bounds instead
    pub fn for_period<Tz: TimeZone>(
        period: Period,
        anchor: NaiveDate,
        tz: &Tz,
    ) -> Result<Option<Self>, WindowError> {
        let window = match period {
            Period::Week => Self::week_containing(anchor, tz)?,
            Period::Month => Self::month_containing(anchor, tz)?,
            Period::Year => Self::year_containing(anchor, tz)?,
            Period::All => Self::all_time(),
            Period::Custom => return Ok(None),
        };
        Ok(Some(window))
    }

    pub fn bounded_start(&self) -> Option<DateTime<Utc>> {
        (self.start != DateTime::<Utc>::MIN_UTC).then_some(self.start)
    }

    pub fn bounded_end(&self) -> Option<DateTime<Utc>> {
        (self.end != DateTime::<Utc>::MAX_UTC).then_some(self.end)
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }

    pub fn filter(&self, sessions: &[SessionRecord]) -> Vec<SessionRecord> {
        filter_by_date_range(sessions, self.start, self.end)
    }
}
