use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::grades::{ClimbingType, Difficulty};

/// Outcome of a route attempt. Declaration order is the display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResultKind {
    Send,
    Flash,
    Onsight,
    Fail,
}

impl ResultKind {
    /// Send, flash and onsight count as a completed route.
    pub fn is_completion(&self) -> bool {
        !matches!(self, ResultKind::Fail)
    }

    /// Attempt count assumed when none was logged.
    pub fn implied_attempts(&self) -> u32 {
        match self {
            ResultKind::Flash | ResultKind::Onsight => 1,
            ResultKind::Send | ResultKind::Fail => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    Indoor,
    Outdoor,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Hold color used to identify gym problems.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColorTag {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Black,
    White,
    Gray,
}

impl ColorTag {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Session duration must be greater than zero minutes")]
    NonPositiveDuration,
    #[error("Session mood must not be empty")]
    EmptyMood,
    #[error("Route {route_id} has a non-positive attempt count")]
    NonPositiveAttempts { route_id: String },
    #[error("Session duration exceeds {} minutes", MAX_STORED_COUNT)]
    DurationTooLong,
    #[error("Route {} exceeds {} attempts", .route_id, MAX_STORED_COUNT)]
    TooManyAttempts { route_id: String },
}

/// Upper bound for stored minute and attempt counts, the range of a Postgres INTEGER
pub const MAX_STORED_COUNT: u32 = i32::MAX as u32;

/// One attempted climb within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub id: String,
    pub difficulty: Option<Difficulty>,
    pub attempts: Option<u32>,
    pub result: Option<ResultKind>,
    pub color: Option<ColorTag>, // indoor identification
    pub name: Option<String>,    // outdoor identification
}

impl RouteRecord {
    pub fn new(difficulty: Option<Difficulty>, result: Option<ResultKind>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            difficulty,
            attempts: None,
            result,
            color: None,
            name: None,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn with_color(mut self, color: ColorTag) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.result.is_some_and(|result| result.is_completion())
    }

    /// Logged attempts, or the count implied by the result when none were logged.
    pub fn effective_attempts(&self) -> u32 {
        match (self.attempts, self.result) {
            (Some(attempts), _) => attempts,
            (None, Some(result)) => result.implied_attempts(),
            (None, None) => 0,
        }
    }

    pub fn climbing_type(&self) -> Option<ClimbingType> {
        self.difficulty.map(|difficulty| difficulty.climbing_type())
    }
}

/// One logged climbing outing. Owns its routes; route order is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub mood: String,
    pub notes: Option<String>,
    pub environment: Option<Environment>,
    pub location: Option<String>,
    pub routes: Vec<RouteRecord>,
}

impl SessionRecord {
    /// Creates a session with a generated ID and no routes
    pub fn new(date: DateTime<Utc>, duration_minutes: u32, mood: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            duration_minutes,
            mood: mood.into(),
            notes: None,
            environment: None,
            location: None,
            routes: Vec::new(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_route(mut self, route: RouteRecord) -> Self {
        self.routes.push(route);
        self
    }

    /// Checks that the session can be persisted
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.duration_minutes == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }
        if self.duration_minutes > MAX_STORED_COUNT {
            return Err(ValidationError::DurationTooLong);
        }
        if self.mood.trim().is_empty() {
            return Err(ValidationError::EmptyMood);
        }
        if let Some(route) = self.routes.iter().find(|route| route.attempts == Some(0)) {
            return Err(ValidationError::NonPositiveAttempts {
                route_id: route.id.clone(),
            });
        }
        if let Some(route) = self
            .routes
            .iter()
            .find(|route| route.attempts.is_some_and(|attempts| attempts > MAX_STORED_COUNT))
        {
            return Err(ValidationError::TooManyAttempts {
                route_id: route.id.clone(),
            });
        }
        Ok(())
    }

    pub fn is_savable(&self) -> bool {
        self.validate().is_ok()
    }

    /// Discipline a newly added route starts with: the last graded route's, else bouldering.
    pub fn next_route_type(&self) -> ClimbingType {
        self.routes
            .iter()
            .rev()
            .find_map(|route| route.climbing_type())
            .unwrap_or_default()
    }

    pub fn remove_route(&mut self, route_id: &str) -> Option<RouteRecord> {
        let position = self.routes.iter().position(|route| route.id == route_id)?;
        Some(self.routes.remove(position))
    }
}
