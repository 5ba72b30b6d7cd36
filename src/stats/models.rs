use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::grades::Difficulty;
use crate::session::models::ResultKind;

/// Shown wherever a grade statistic has no data
pub const NO_GRADE: &str = "-";

/// Hardest grade of one result kind within one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionPoint {
    pub session_id: String,
    pub date: DateTime<Utc>,
    pub grade: Difficulty,
    /// Index within the grade's own discipline scale
    pub grade_index: usize,
    pub result: ResultKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBucket {
    pub grade: Difficulty,
    pub result: ResultKind,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionBreakdown {
    pub onsight: usize,
    pub flash: usize,
    pub send: usize,
    pub fail: usize,
}

impl CompletionBreakdown {
    pub fn record(&mut self, result: ResultKind) {
        match result {
            ResultKind::Onsight => self.onsight += 1,
            ResultKind::Flash => self.flash += 1,
            ResultKind::Send => self.send += 1,
            ResultKind::Fail => self.fail += 1,
        }
    }

    pub fn completed(&self) -> usize {
        self.onsight + self.flash + self.send
    }

    pub fn total(&self) -> usize {
        self.completed() + self.fail
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndoorOutdoorCounts {
    pub indoor: usize,
    pub outdoor: usize,
}

impl IndoorOutdoorCounts {
    /// Share of sessions with a known environment that were indoors
    pub fn indoor_ratio(&self) -> Option<f64> {
        let known = self.indoor + self.outdoor;
        (known > 0).then(|| self.indoor as f64 / known as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

/// First completion of a grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub grade: Difficulty,
    pub label: String,
    /// English month name of the session date
    pub month: String,
    pub date: DateTime<Utc>,
    pub session_id: String,
}

/// One cell of the calendar heatmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub sessions: usize,
    pub minutes: u32,
}

/// Aggregates for one date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// `None` when the window is unbounded on that side
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub session_count: usize,
    pub active_days: usize,
    pub longest_streak: usize,
    pub total_hours: f64,
    pub completed_routes: usize,
    pub total_attempts: u64,
    pub highest_bouldering: String,
    pub highest_sport: String,
    pub highest_overall: String,
    pub completion: CompletionBreakdown,
    pub indoor_outdoor: IndoorOutdoorCounts,
    pub top_locations: Vec<LocationCount>,
    pub milestones: Vec<Milestone>,
}
