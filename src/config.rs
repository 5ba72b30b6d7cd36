use chrono::{FixedOffset, Offset, Utc};
use tracing::warn;

/// Runtime configuration read from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: Option<String>,
    /// Offset used for calendar days when a request does not supply one
    pub tz_offset_minutes: i32,
    pub top_locations_limit: usize,
    pub milestone_limit: usize,
    pub quick_log_duration_minutes: u32,
    pub quick_log_mood: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            tz_offset_minutes: 0,
            top_locations_limit: 5,
            milestone_limit: 5,
            quick_log_duration_minutes: 60,
            quick_log_mood: "good".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Malformed values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            tz_offset_minutes: parse_or(&lookup, "TZ_OFFSET_MINUTES", defaults.tz_offset_minutes),
            top_locations_limit: parse_or(
                &lookup,
                "TOP_LOCATIONS_LIMIT",
                defaults.top_locations_limit,
            ),
            milestone_limit: parse_or(&lookup, "MILESTONE_LIMIT", defaults.milestone_limit),
            quick_log_duration_minutes: parse_or(
                &lookup,
                "QUICK_LOG_DURATION_MINUTES",
                defaults.quick_log_duration_minutes,
            )
            .max(1),
            quick_log_mood: lookup("QUICK_LOG_MOOD")
                .filter(|mood| !mood.trim().is_empty())
                .unwrap_or(defaults.quick_log_mood),
        }
    }

    pub fn default_offset(&self) -> FixedOffset {
        offset_from_minutes(self.tz_offset_minutes)
    }
}

/// Converts minutes east of UTC to an offset, clamping to UTC when out of range
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| {
        warn!(minutes, "Timezone offset out of range, using UTC");
        Utc.fix()
    })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring malformed config value");
            default
        }),
        None => default,
    }
}
