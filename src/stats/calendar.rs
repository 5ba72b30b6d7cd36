use chrono::{Datelike, Months, NaiveDate, TimeZone};
use std::collections::BTreeMap;

use super::models::DayActivity;
use crate::session::models::SessionRecord;

/// Activity for each day in `start..end`, including days with no sessions
pub fn calendar_range<Tz: TimeZone>(
    sessions: &[SessionRecord],
    start: NaiveDate,
    end: NaiveDate,
    tz: &Tz,
) -> Vec<DayActivity> {
    let mut by_day: BTreeMap<NaiveDate, DayActivity> = start
        .iter_days()
        .take_while(|day| *day < end)
        .map(|day| {
            (
                day,
                DayActivity {
                    date: day,
                    sessions: 0,
                    minutes: 0,
                },
            )
        })
        .collect();

    for session in sessions {
        let local_day = session.date.with_timezone(tz).date_naive();
        if let Some(activity) = by_day.get_mut(&local_day) {
            activity.sessions += 1;
            activity.minutes = activity.minutes.saturating_add(session.duration_minutes);
        }
    }

    by_day.into_values().collect()
}

/// Heatmap cells for one calendar month; empty when the month does not exist
pub fn calendar_month<Tz: TimeZone>(
    sessions: &[SessionRecord],
    year: i32,
    month: u32,
    tz: &Tz,
) -> Vec<DayActivity> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let end = first
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    calendar_range(sessions, first, end, tz)
}

/// Number of distinct local days with at least one session
pub fn active_days<Tz: TimeZone>(sessions: &[SessionRecord], tz: &Tz) -> usize {
    let mut days: Vec<NaiveDate> = sessions
        .iter()
        .map(|session| session.date.with_timezone(tz).date_naive())
        .collect();
    days.sort_unstable();
    days.dedup();
    days.len()
}

/// Longest run of consecutive local days with a session
pub fn longest_streak<Tz: TimeZone>(sessions: &[SessionRecord], tz: &Tz) -> usize {
    let mut days: Vec<NaiveDate> = sessions
        .iter()
        .map(|session| session.date.with_timezone(tz).date_naive())
        .collect();
    days.sort_unstable();
    days.dedup();

    let mut best = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        current = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => current + 1,
            _ => 1,
        };
        best = best.max(current);
        previous = Some(day);
    }
    best
}
