use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    aggregator::{
        completed_routes, completion_breakdown, grade_distribution, grade_label,
        grade_progression, has_logged_today, highest_grade, highest_grade_overall,
        indoor_outdoor_counts, milestones, top_locations, total_attempts, total_duration_hours,
    },
    calendar::{active_days, calendar_month, longest_streak},
    models::{DayActivity, GradeBucket, ProgressionPoint, StatsSummary},
    window::DateWindow,
};
use crate::{
    config::AppConfig,
    grades::ClimbingType,
    session::{models::SessionRecord, repository::SessionRepository},
    shared::AppError,
};

/// Builds the summary for sessions already restricted to `window`
pub fn summarize(
    sessions: &[SessionRecord],
    window: DateWindow,
    tz: &FixedOffset,
    top_locations_limit: usize,
    milestone_limit: usize,
) -> StatsSummary {
    let mut reached = milestones(sessions, tz);
    reached.truncate(milestone_limit);

    StatsSummary {
        start: window.bounded_start(),
        end: window.bounded_end(),
        session_count: sessions.len(),
        active_days: active_days(sessions, tz),
        longest_streak: longest_streak(sessions, tz),
        total_hours: total_duration_hours(sessions),
        completed_routes: completed_routes(sessions).len(),
        total_attempts: total_attempts(sessions),
        highest_bouldering: grade_label(highest_grade(sessions, ClimbingType::Bouldering)),
        highest_sport: grade_label(highest_grade(sessions, ClimbingType::Sport)),
        highest_overall: grade_label(highest_grade_overall(sessions)),
        completion: completion_breakdown(sessions),
        indoor_outdoor: indoor_outdoor_counts(sessions),
        top_locations: top_locations(sessions, top_locations_limit),
        milestones: reached,
    }
}

/// Loads a snapshot from the repository and runs the aggregators over it
pub struct StatsService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
    config: Arc<AppConfig>,
}

impl StatsService {
    pub fn new(
        repository: Arc<dyn SessionRepository + Send + Sync>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self { repository, config }
    }

    async fn snapshot(&self, window: &DateWindow) -> Result<Vec<SessionRecord>, AppError> {
        let all = self.repository.list_all().await?;
        let selected = window.filter(&all);

        debug!(
            total_sessions = all.len(),
            selected_sessions = selected.len(),
            "Loaded session snapshot"
        );
        Ok(selected)
    }

    #[instrument(skip(self))]
    pub async fn summary(
        &self,
        window: DateWindow,
        tz: FixedOffset,
    ) -> Result<StatsSummary, AppError> {
        let sessions = self.snapshot(&window).await?;
        Ok(summarize(
            &sessions,
            window,
            &tz,
            self.config.top_locations_limit,
            self.config.milestone_limit,
        ))
    }

    #[instrument(skip(self))]
    pub async fn progression(
        &self,
        window: DateWindow,
        climbing_type: ClimbingType,
    ) -> Result<Vec<ProgressionPoint>, AppError> {
        let sessions = self.snapshot(&window).await?;
        Ok(grade_progression(&sessions, climbing_type))
    }

    #[instrument(skip(self))]
    pub async fn distribution(
        &self,
        window: DateWindow,
        climbing_type: ClimbingType,
    ) -> Result<Vec<GradeBucket>, AppError> {
        let sessions = self.snapshot(&window).await?;
        Ok(grade_distribution(&sessions, climbing_type))
    }

    #[instrument(skip(self))]
    pub async fn calendar(
        &self,
        year: i32,
        month: u32,
        tz: FixedOffset,
    ) -> Result<Vec<DayActivity>, AppError> {
        let sessions = self.repository.list_all().await?;
        Ok(calendar_month(&sessions, year, month, &tz))
    }

    #[instrument(skip(self))]
    pub async fn logged_today(&self, now: DateTime<FixedOffset>) -> Result<bool, AppError> {
        let sessions = self.repository.list_all().await?;
        Ok(has_logged_today(&sessions, &now))
    }
}
