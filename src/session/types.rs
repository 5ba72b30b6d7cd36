use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::models::{ColorTag, Environment, ResultKind, RouteRecord, SessionRecord};
use crate::grades::{ClimbingType, Difficulty};

/// Route entry as submitted by a client
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteInput {
    /// Existing route ID when editing; unknown or repeated IDs are replaced
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub attempts: Option<u32>,
    #[serde(default)]
    pub result: Option<ResultKind>,
    #[serde(default)]
    pub color: Option<ColorTag>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RouteInput {
    /// Builds the stored route, keeping the client ID only if it can be taken from `reusable`
    ///
    /// Each reused ID is removed from the set so it is handed out at most once.
    pub fn into_record(self, reusable: &mut HashSet<String>) -> RouteRecord {
        let id = self
            .id
            .filter(|id| reusable.remove(id))
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        RouteRecord {
            id,
            difficulty: self.difficulty,
            attempts: self.attempts,
            result: self.result,
            color: self.color,
            name: self.name.filter(|name| !name.trim().is_empty()),
        }
    }
}

/// Request payload for logging or editing a full session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionRequest {
    /// Defaults to the time the request is handled
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub mood: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub environment: Option<Environment>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub routes: Vec<RouteInput>,
}

/// Request payload for a quick log; missing fields use configured defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuickLogRequest {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub mood: Option<String>,
}

/// Session as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: SessionRecord,
    /// Discipline pre-selected for the next route a client adds
    pub next_route_type: ClimbingType,
}

impl From<SessionRecord> for SessionResponse {
    fn from(session: SessionRecord) -> Self {
        let next_route_type = session.next_route_type();
        Self {
            session,
            next_route_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: Option<&str>) -> RouteInput {
        RouteInput {
            id: id.map(str::to_string),
            ..RouteInput::default()
        }
    }

    #[test]
    fn test_known_id_is_reused_once() {
        let mut reusable: HashSet<String> = ["r1".to_string()].into_iter().collect();

        let first = input(Some("r1")).into_record(&mut reusable);
        let second = input(Some("r1")).into_record(&mut reusable);

        assert_eq!(first.id, "r1");
        assert_ne!(second.id, "r1");
        assert!(reusable.is_empty());
    }

    #[test]
    fn test_unknown_or_missing_id_is_generated() {
        let mut reusable = HashSet::new();

        let unknown = input(Some("from-another-session")).into_record(&mut reusable);
        let missing = input(None).into_record(&mut reusable);

        assert_ne!(unknown.id, "from-another-session");
        assert!(!missing.id.is_empty());
        assert_ne!(unknown.id, missing.id);
    }

    #[test]
    fn test_blank_name_is_dropped() {
        let route = RouteInput {
            name: Some("  ".to_string()),
            ..RouteInput::default()
        }
        .into_record(&mut HashSet::new());

        assert_eq!(route.name, None);
    }
}
