use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Postgres, Row, Transaction};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{ColorTag, Environment, ResultKind, RouteRecord, SessionRecord};
use crate::grades::Difficulty;
use crate::shared::AppError;

/// Trait for climbing session persistence
#[async_trait]
pub trait SessionRepository {
    /// All sessions, oldest first
    async fn list_all(&self) -> Result<Vec<SessionRecord>, AppError>;
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, AppError>;
    /// Inserts the session or replaces the stored copy with the same ID
    async fn save(&self, session: &SessionRecord) -> Result<(), AppError>;
    async fn delete(&self, session_id: &str) -> Result<(), AppError>;
}

fn sort_chronologically(sessions: &mut [SessionRecord]) {
    sessions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
}

/// In-memory implementation of SessionRepository for development and testing
///
/// Data lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates an in-memory repository with pre-populated sessions
    pub fn with_sessions(sessions: Vec<SessionRecord>) -> Self {
        let session_map = sessions
            .into_iter()
            .map(|session| (session.id.clone(), session))
            .collect();

        Self {
            sessions: Arc::new(RwLock::new(session_map)),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<SessionRecord>, AppError> {
        let sessions = self.sessions.read().await;
        let mut all: Vec<SessionRecord> = sessions.values().cloned().collect();
        sort_chronologically(&mut all);

        debug!(session_count = all.len(), "Listed sessions from memory");
        Ok(all)
    }

    #[instrument(skip(self))]
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, AppError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(session_id).cloned();

        if session.is_none() {
            debug!(session_id = %session_id, "Session not found in memory");
        }

        Ok(session)
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn save(&self, session: &SessionRecord) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        let replaced = sessions
            .insert(session.id.clone(), session.clone())
            .is_some();

        debug!(
            replaced,
            route_count = session.routes.len(),
            "Session saved in memory"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, session_id: &str) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(session_id).is_none() {
            warn!(session_id = %session_id, "Session not found for deletion in memory");
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        debug!(session_id = %session_id, "Session deleted from memory");
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS climbing_sessions (
        id TEXT PRIMARY KEY,
        date TIMESTAMPTZ NOT NULL,
        duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
        mood TEXT NOT NULL,
        notes TEXT,
        environment TEXT,
        location TEXT
    )",
    "CREATE TABLE IF NOT EXISTS climbing_routes (
        id TEXT PRIMARY KEY,
        session_id TEXT NOT NULL REFERENCES climbing_sessions(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        grade TEXT,
        attempts INTEGER CHECK (attempts > 0),
        result TEXT,
        color TEXT,
        name TEXT
    )",
    "CREATE INDEX IF NOT EXISTS climbing_routes_session_idx
        ON climbing_routes (session_id, position)",
];

/// PostgreSQL implementation of session repository
///
/// Sessions and their routes live in two tables; route order is kept in `position`.
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they do not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Failed to apply schema");
                    AppError::DatabaseError(e.to_string())
                })?;
        }
        debug!("Session schema ready");
        Ok(())
    }

    async fn insert_routes(
        tx: &mut Transaction<'_, Postgres>,
        session: &SessionRecord,
    ) -> Result<(), AppError> {
        for (position, route) in session.routes.iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                AppError::DatabaseError(format!("Route position out of range: {}", position))
            })?;
            let attempts = route
                .attempts
                .map(|attempts| to_integer_column("attempts", attempts))
                .transpose()?;

            sqlx::query(
                "INSERT INTO climbing_routes (id, session_id, position, grade, attempts, result, color, name) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
            )
            .bind(&route.id)
            .bind(&session.id)
            .bind(position)
            .bind(route.difficulty.map(|d| d.label()))
            .bind(attempts)
            .bind(route.result.map(|r| r.as_str()))
            .bind(route.color.map(|c| c.as_str()))
            .bind(route.name.as_deref())
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                warn!(error = %e, route_id = %route.id, "Failed to insert route in database");
                db_error(e)
            })?;
        }
        Ok(())
    }
}

fn db_error(e: sqlx::Error) -> AppError {
    AppError::DatabaseError(e.to_string())
}

fn parse_column<T: FromStr>(column: &str, raw: Option<String>) -> Result<Option<T>, AppError> {
    raw.map(|value| {
        value.parse::<T>().map_err(|_| {
            warn!(column, value = %value, "Unrecognized value in session store");
            AppError::DatabaseError(format!("Unrecognized {} value: {}", column, value))
        })
    })
    .transpose()
}

fn non_negative(column: &str, value: i32) -> Result<u32, AppError> {
    u32::try_from(value)
        .map_err(|_| AppError::DatabaseError(format!("Negative {} value: {}", column, value)))
}

fn to_integer_column(column: &str, value: u32) -> Result<i32, AppError> {
    i32::try_from(value)
        .map_err(|_| AppError::DatabaseError(format!("{} value out of range: {}", column, value)))
}

fn route_from_row(row: &PgRow) -> Result<(String, RouteRecord), AppError> {
    let session_id: String = row.try_get("session_id").map_err(db_error)?;
    let attempts: Option<i32> = row.try_get("attempts").map_err(db_error)?;

    let route = RouteRecord {
        id: row.try_get("id").map_err(db_error)?,
        difficulty: parse_column::<Difficulty>("grade", row.try_get("grade").map_err(db_error)?)?,
        attempts: attempts
            .map(|value| non_negative("attempts", value))
            .transpose()?,
        result: parse_column::<ResultKind>("result", row.try_get("result").map_err(db_error)?)?,
        color: parse_column::<ColorTag>("color", row.try_get("color").map_err(db_error)?)?,
        name: row.try_get("name").map_err(db_error)?,
    };

    Ok((session_id, route))
}

fn session_from_row(row: &PgRow) -> Result<SessionRecord, AppError> {
    let duration: i32 = row.try_get("duration_minutes").map_err(db_error)?;

    Ok(SessionRecord {
        id: row.try_get("id").map_err(db_error)?,
        date: row.try_get("date").map_err(db_error)?,
        duration_minutes: non_negative("duration_minutes", duration)?,
        mood: row.try_get("mood").map_err(db_error)?,
        notes: row.try_get("notes").map_err(db_error)?,
        environment: parse_column::<Environment>(
            "environment",
            row.try_get("environment").map_err(db_error)?,
        )?,
        location: row.try_get("location").map_err(db_error)?,
        routes: Vec::new(),
    })
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<SessionRecord>, AppError> {
        let session_rows = sqlx::query(
            "SELECT id, date, duration_minutes, mood, notes, environment, location FROM climbing_sessions ORDER BY date, id"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list sessions from database");
            db_error(e)
        })?;

        let route_rows = sqlx::query(
            "SELECT id, session_id, grade, attempts, result, color, name FROM climbing_routes ORDER BY session_id, position"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list routes from database");
            db_error(e)
        })?;

        let mut routes_by_session: HashMap<String, Vec<RouteRecord>> = HashMap::new();
        for row in &route_rows {
            let (session_id, route) = route_from_row(row)?;
            routes_by_session.entry(session_id).or_default().push(route);
        }

        let mut sessions = Vec::with_capacity(session_rows.len());
        for row in &session_rows {
            let mut session = session_from_row(row)?;
            session.routes = routes_by_session.remove(&session.id).unwrap_or_default();
            sessions.push(session);
        }

        debug!(
            session_count = sessions.len(),
            route_count = route_rows.len(),
            "Listed sessions from database"
        );
        Ok(sessions)
    }

    #[instrument(skip(self))]
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, date, duration_minutes, mood, notes, environment, location FROM climbing_sessions WHERE id = $1"
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = %session_id, "Failed to fetch session from database");
            db_error(e)
        })?;

        let Some(row) = row else {
            debug!(session_id = %session_id, "Session not found in database");
            return Ok(None);
        };

        let mut session = session_from_row(&row)?;

        let route_rows = sqlx::query(
            "SELECT id, session_id, grade, attempts, result, color, name FROM climbing_routes WHERE session_id = $1 ORDER BY position"
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = %session_id, "Failed to fetch routes from database");
            db_error(e)
        })?;

        for row in &route_rows {
            let (_, route) = route_from_row(row)?;
            session.routes.push(route);
        }

        Ok(Some(session))
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn save(&self, session: &SessionRecord) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            "INSERT INTO climbing_sessions (id, date, duration_minutes, mood, notes, environment, location) VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO UPDATE SET date = EXCLUDED.date, duration_minutes = EXCLUDED.duration_minutes, mood = EXCLUDED.mood, notes = EXCLUDED.notes, environment = EXCLUDED.environment, location = EXCLUDED.location"
        )
        .bind(&session.id)
        .bind(session.date)
        .bind(to_integer_column("duration_minutes", session.duration_minutes)?)
        .bind(&session.mood)
        .bind(session.notes.as_deref())
        .bind(session.environment.map(|e| e.as_str()))
        .bind(session.location.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to upsert session in database");
            db_error(e)
        })?;

        sqlx::query("DELETE FROM climbing_routes WHERE session_id = $1")
            .bind(&session.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        Self::insert_routes(&mut tx, session).await?;

        tx.commit().await.map_err(db_error)?;

        debug!(
            route_count = session.routes.len(),
            "Session saved in database"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, session_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM climbing_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, session_id = %session_id, "Failed to delete session from database");
                db_error(e)
            })?;

        if result.rows_affected() == 0 {
            warn!(session_id = %session_id, "Session not found for deletion");
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        debug!(session_id = %session_id, "Session deleted from database");
        Ok(())
    }
}
