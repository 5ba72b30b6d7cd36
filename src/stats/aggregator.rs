//! Pure aggregation over session snapshots.
//!
//! Nothing here fails: missing data yields zero counts, empty lists or `None`
//! (rendered as [`NO_GRADE`]).

use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};

use super::models::{
    CompletionBreakdown, GradeBucket, IndoorOutdoorCounts, LocationCount, Milestone,
    ProgressionPoint, NO_GRADE,
};
use crate::grades::{combined_order, index_of, ClimbingType, Difficulty};
use crate::session::models::{Environment, ResultKind, RouteRecord, SessionRecord};

/// Result kinds sampled by the progression chart, in emission order per session
const PROGRESSION_RESULTS: [ResultKind; 3] =
    [ResultKind::Send, ResultKind::Flash, ResultKind::Onsight];

/// Sessions with `start <= date < end`
pub fn filter_by_date_range(
    sessions: &[SessionRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<SessionRecord> {
    sessions
        .iter()
        .filter(|session| start <= session.date && session.date < end)
        .cloned()
        .collect()
}

pub fn total_duration_hours(sessions: &[SessionRecord]) -> f64 {
    let minutes: u64 = sessions
        .iter()
        .map(|session| u64::from(session.duration_minutes))
        .sum();
    minutes as f64 / 60.0
}

pub fn completed_routes(sessions: &[SessionRecord]) -> Vec<&RouteRecord> {
    sessions
        .iter()
        .flat_map(|session| session.routes.iter())
        .filter(|route| route.is_completed())
        .collect()
}

/// Sum of logged attempts, with flash/onsight implying one when unlogged
pub fn total_attempts(sessions: &[SessionRecord]) -> u64 {
    sessions
        .iter()
        .flat_map(|session| session.routes.iter())
        .map(|route| u64::from(route.effective_attempts()))
        .fold(0, u64::saturating_add)
}

/// Keeps the first of equally ranked items.
fn hardest_by<'a, I, F>(grades: I, rank: F) -> Option<Difficulty>
where
    I: Iterator<Item = &'a Difficulty>,
    F: Fn(&Difficulty) -> usize,
{
    grades.fold(None, |best: Option<Difficulty>, candidate| match best {
        Some(current) if rank(candidate) <= rank(&current) => Some(current),
        _ => Some(*candidate),
    })
}

/// Hardest completed grade of one discipline, ranked on that discipline's own scale
pub fn highest_grade(
    sessions: &[SessionRecord],
    climbing_type: ClimbingType,
) -> Option<Difficulty> {
    hardest_by(
        completed_routes(sessions)
            .into_iter()
            .filter_map(|route| route.difficulty.as_ref())
            .filter(|difficulty| difficulty.is_type(climbing_type)),
        Difficulty::index,
    )
}

/// Hardest completed grade across both disciplines, ranked by [`combined_order`]
pub fn highest_grade_overall(sessions: &[SessionRecord]) -> Option<Difficulty> {
    let order = combined_order();
    hardest_by(
        completed_routes(sessions)
            .into_iter()
            .filter_map(|route| route.difficulty.as_ref()),
        |difficulty| index_of(difficulty, &order),
    )
}

pub fn grade_label(grade: Option<Difficulty>) -> String {
    grade
        .map(|difficulty| difficulty.label().to_string())
        .unwrap_or_else(|| NO_GRADE.to_string())
}

fn by_date(sessions: &[SessionRecord]) -> Vec<&SessionRecord> {
    let mut ordered: Vec<&SessionRecord> = sessions.iter().collect();
    ordered.sort_by_key(|session| session.date);
    ordered
}

/// Best send, flash and onsight of each session; up to three points per session, oldest first
pub fn grade_progression(
    sessions: &[SessionRecord],
    climbing_type: ClimbingType,
) -> Vec<ProgressionPoint> {
    let mut points = Vec::new();

    for session in by_date(sessions) {
        for result in PROGRESSION_RESULTS {
            let hardest = hardest_by(
                session
                    .routes
                    .iter()
                    .filter(|route| route.result == Some(result))
                    .filter_map(|route| route.difficulty.as_ref())
                    .filter(|difficulty| difficulty.is_type(climbing_type)),
                Difficulty::index,
            );

            if let Some(grade) = hardest {
                points.push(ProgressionPoint {
                    session_id: session.id.clone(),
                    date: session.date,
                    grade,
                    grade_index: grade.index(),
                    result,
                });
            }
        }
    }

    points
}

fn result_rank(result: ResultKind) -> usize {
    match result {
        ResultKind::Send => 0,
        ResultKind::Flash => 1,
        ResultKind::Onsight => 2,
        ResultKind::Fail => 3,
    }
}

/// Route counts per (grade, result), hardest grade first
///
/// Counts every route of the discipline that has both a grade and a result, fails included.
pub fn grade_distribution(
    sessions: &[SessionRecord],
    climbing_type: ClimbingType,
) -> Vec<GradeBucket> {
    let mut counts: HashMap<(Difficulty, ResultKind), usize> = HashMap::new();

    for route in sessions.iter().flat_map(|session| session.routes.iter()) {
        if let (Some(grade), Some(result)) = (route.difficulty, route.result) {
            if grade.is_type(climbing_type) {
                *counts.entry((grade, result)).or_insert(0) += 1;
            }
        }
    }

    let mut buckets: Vec<GradeBucket> = counts
        .into_iter()
        .map(|((grade, result), count)| GradeBucket {
            grade,
            result,
            count,
        })
        .collect();
    buckets.sort_by(|a, b| {
        b.grade
            .index()
            .cmp(&a.grade.index())
            .then_with(|| result_rank(a.result).cmp(&result_rank(b.result)))
    });
    buckets
}

pub fn completion_breakdown(sessions: &[SessionRecord]) -> CompletionBreakdown {
    let mut breakdown = CompletionBreakdown::default();
    for result in sessions
        .iter()
        .flat_map(|session| session.routes.iter())
        .filter_map(|route| route.result)
    {
        breakdown.record(result);
    }
    breakdown
}

/// Counts sessions, not routes
pub fn indoor_outdoor_counts(sessions: &[SessionRecord]) -> IndoorOutdoorCounts {
    sessions
        .iter()
        .fold(IndoorOutdoorCounts::default(), |mut counts, session| {
            match session.environment {
                Some(Environment::Indoor) => counts.indoor += 1,
                Some(Environment::Outdoor) => counts.outdoor += 1,
                None => {}
            }
            counts
        })
}

/// Most visited locations; equal counts keep first-seen order
pub fn top_locations(sessions: &[SessionRecord], limit: usize) -> Vec<LocationCount> {
    let mut ranked: Vec<LocationCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for location in sessions
        .iter()
        .filter_map(|session| session.location.as_deref())
        .map(str::trim)
        .filter(|location| !location.is_empty())
    {
        match positions.get(location) {
            Some(&position) => ranked[position].count += 1,
            None => {
                positions.insert(location, ranked.len());
                ranked.push(LocationCount {
                    location: location.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among ties
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

/// First completion of each grade, in session date order
///
/// The month label is taken from the session's local date in `tz`.
pub fn milestones<Tz: TimeZone>(sessions: &[SessionRecord], tz: &Tz) -> Vec<Milestone> {
    let mut seen: HashSet<Difficulty> = HashSet::new();
    let mut reached = Vec::new();

    for session in by_date(sessions) {
        for grade in session
            .routes
            .iter()
            .filter(|route| route.is_completed())
            .filter_map(|route| route.difficulty)
        {
            if seen.insert(grade) {
                reached.push(Milestone {
                    grade,
                    label: grade.label().to_string(),
                    month: session
                        .date
                        .with_timezone(tz)
                        .date_naive()
                        .format("%B")
                        .to_string(),
                    date: session.date,
                    session_id: session.id.clone(),
                });
            }
        }
    }

    reached
}

/// Whether any session falls on `today`'s calendar day in `today`'s timezone
pub fn has_logged_today<Tz: TimeZone>(sessions: &[SessionRecord], today: &DateTime<Tz>) -> bool {
    let day = today.date_naive();
    let tz = today.timezone();
    sessions
        .iter()
        .any(|session| session.date.with_timezone(&tz).date_naive() == day)
}
