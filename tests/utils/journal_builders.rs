use chrono::{TimeZone, Utc};

use cragbook::{
    grades::Difficulty,
    session::{Environment, ResultKind, RouteRecord, SessionRecord},
};

// ============================================================================
// Journal Fixtures
// ============================================================================

/// Route with a parsed grade label, e.g. `route("V4", ResultKind::Send)`
pub fn route(label: &str, result: ResultKind) -> RouteRecord {
    let difficulty: Difficulty = label.parse().expect("test grade label should parse");
    RouteRecord::new(Some(difficulty), Some(result))
}

/// Builds a list of sessions for seeding a repository
pub struct JournalBuilder {
    sessions: Vec<SessionRecord>,
}

impl JournalBuilder {
    pub fn new() -> Self {
        Self { sessions: vec![] }
    }

    /// Adds a session at 18:00 UTC on the given day
    pub fn session(
        mut self,
        (year, month, day): (i32, u32, u32),
        minutes: u32,
        location: &str,
        environment: Environment,
        routes: Vec<RouteRecord>,
    ) -> Self {
        let date = Utc
            .with_ymd_and_hms(year, month, day, 18, 0, 0)
            .single()
            .expect("valid test date");
        let mut session = SessionRecord::new(date, minutes, "good")
            .with_environment(environment)
            .with_location(location);
        session.routes = routes;
        self.sessions.push(session);
        self
    }

    pub fn build(self) -> Vec<SessionRecord> {
        self.sessions
    }
}
