use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{RouteRecord, SessionRecord},
    repository::SessionRepository,
    types::{QuickLogRequest, RouteInput, SessionRequest},
};
use crate::{config::AppConfig, shared::AppError};

/// Service for logging, editing and removing climbing sessions
pub struct SessionService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
    config: Arc<AppConfig>,
}

fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Client route IDs survive only when they name one of the session's current routes
fn apply_request(session: &mut SessionRecord, request: SessionRequest) {
    let mut reusable: HashSet<String> = session
        .routes
        .iter()
        .map(|route| route.id.clone())
        .collect();

    if let Some(date) = request.date {
        session.date = date;
    }
    session.duration_minutes = request.duration_minutes;
    session.mood = request.mood;
    session.notes = clean_text(request.notes);
    session.environment = request.environment;
    session.location = clean_text(request.location);
    session.routes = request
        .routes
        .into_iter()
        .map(|route| route.into_record(&mut reusable))
        .collect();
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository + Send + Sync>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self { repository, config }
    }

    /// Logs a fully described session
    #[instrument(skip(self, request))]
    pub async fn log_session(
        &self,
        request: SessionRequest,
        now: DateTime<Utc>,
    ) -> Result<SessionRecord, AppError> {
        let mut session = SessionRecord::new(now, 0, String::new());
        apply_request(&mut session, request);

        self.persist(&session).await?;
        info!(
            session_id = %session.id,
            route_count = session.routes.len(),
            "Session logged"
        );
        Ok(session)
    }

    /// Logs a session immediately using configured defaults for anything omitted
    #[instrument(skip(self, request))]
    pub async fn quick_log(
        &self,
        request: QuickLogRequest,
        now: DateTime<Utc>,
    ) -> Result<SessionRecord, AppError> {
        let session = SessionRecord::new(
            request.date.unwrap_or(now),
            request
                .duration_minutes
                .unwrap_or(self.config.quick_log_duration_minutes),
            request
                .mood
                .unwrap_or_else(|| self.config.quick_log_mood.clone()),
        );

        self.persist(&session).await?;
        info!(session_id = %session.id, "Session quick-logged");
        Ok(session)
    }

    /// Replaces the editable fields of an existing session
    #[instrument(skip(self, request))]
    pub async fn update_session(
        &self,
        session_id: &str,
        request: SessionRequest,
    ) -> Result<SessionRecord, AppError> {
        let mut session = self.require(session_id).await?;
        apply_request(&mut session, request);

        self.persist(&session).await?;
        info!(session_id = %session.id, "Session updated");
        Ok(session)
    }

    /// Appends a route to the end of a session's route list
    #[instrument(skip(self, route))]
    pub async fn add_route(
        &self,
        session_id: &str,
        route: RouteInput,
    ) -> Result<SessionRecord, AppError> {
        let mut session = self.require(session_id).await?;
        session.routes.push(route.into_record(&mut HashSet::new()));

        self.persist(&session).await?;
        info!(
            session_id = %session.id,
            route_count = session.routes.len(),
            "Route added"
        );
        Ok(session)
    }

    #[instrument(skip(self))]
    pub async fn remove_route(
        &self,
        session_id: &str,
        route_id: &str,
    ) -> Result<(RouteRecord, SessionRecord), AppError> {
        let mut session = self.require(session_id).await?;
        let removed = session
            .remove_route(route_id)
            .ok_or_else(|| AppError::NotFound("Route not found".to_string()))?;

        self.persist(&session).await?;
        info!(session_id = %session.id, route_id = %route_id, "Route removed");
        Ok((removed, session))
    }

    #[instrument(skip(self))]
    pub async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        self.repository.delete(session_id).await.map_err(|error| {
            warn!(session_id = %session_id, ?error, "Session delete failed");
            error
        })?;

        info!(session_id = %session_id, "Session deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_session(&self, session_id: &str) -> Result<SessionRecord, AppError> {
        self.require(session_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_sessions(&self) -> Result<Vec<SessionRecord>, AppError> {
        self.repository.list_all().await
    }

    async fn require(&self, session_id: &str) -> Result<SessionRecord, AppError> {
        self.repository
            .get(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    /// Validates then saves; invalid sessions never reach the repository
    async fn persist(&self, session: &SessionRecord) -> Result<(), AppError> {
        if let Err(error) = session.validate() {
            warn!(session_id = %session.id, %error, "Session is not savable");
            return Err(error.into());
        }

        self.repository.save(session).await.map_err(|error| {
            warn!(session_id = %session.id, ?error, "Session save failed");
            error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::{BoulderingGrade, ClimbingType, SportGrade};
    use crate::session::models::{Environment, ResultKind, ValidationError};
    use crate::session::repository::InMemorySessionRepository;
    use crate::shared::test_utils::FailingSessionRepository;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 17, 30, 0).unwrap()
    }

    fn service_with(repo: Arc<InMemorySessionRepository>) -> SessionService {
        SessionService::new(repo, Arc::new(AppConfig::default()))
    }

    fn request() -> SessionRequest {
        SessionRequest {
            date: None,
            duration_minutes: 120,
            mood: "psyched".to_string(),
            notes: Some("  ".to_string()),
            environment: Some(Environment::Indoor),
            location: Some(" The Spot ".to_string()),
            routes: vec![
                RouteInput {
                    difficulty: Some(BoulderingGrade::V4.into()),
                    result: Some(ResultKind::Flash),
                    ..RouteInput::default()
                },
                RouteInput {
                    difficulty: Some(BoulderingGrade::V6.into()),
                    result: Some(ResultKind::Fail),
                    attempts: Some(5),
                    ..RouteInput::default()
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_log_session_persists_cleaned_record() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service = service_with(repo.clone());

        let session = service.log_session(request(), now()).await.unwrap();

        assert_eq!(session.date, now());
        assert_eq!(session.location.as_deref(), Some("The Spot"));
        assert!(session.notes.is_none());
        assert_eq!(session.routes.len(), 2);
        assert_eq!(repo.get(&session.id).await.unwrap().unwrap(), session);
    }

    #[tokio::test]
    async fn test_log_session_rejects_unsavable() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service = service_with(repo.clone());

        let mut empty_mood = request();
        empty_mood.mood = String::new();
        let result = service.log_session(empty_mood, now()).await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::EmptyMood))
        ));

        let mut zero_duration = request();
        zero_duration.duration_minutes = 0;
        let result = service.log_session(zero_duration, now()).await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::NonPositiveDuration))
        ));

        assert_eq!(repo.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_quick_log_uses_configured_defaults() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let config = AppConfig {
            quick_log_duration_minutes: 45,
            quick_log_mood: "chill".to_string(),
            ..AppConfig::default()
        };
        let service = SessionService::new(repo.clone(), Arc::new(config));

        let session = service
            .quick_log(QuickLogRequest::default(), now())
            .await
            .unwrap();

        assert_eq!(session.duration_minutes, 45);
        assert_eq!(session.mood, "chill");
        assert_eq!(session.date, now());
        assert!(session.routes.is_empty());
        assert_eq!(repo.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_session_keeps_id_and_date_when_omitted() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service = service_with(repo.clone());
        let original = service.log_session(request(), now()).await.unwrap();

        let mut edit = request();
        edit.mood = "tired".to_string();
        edit.routes.truncate(1);
        let updated = service.update_session(&original.id, edit).await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.date, original.date);
        assert_eq!(updated.mood, "tired");
        assert_eq!(updated.routes.len(), 1);
        assert_eq!(repo.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_missing_session_is_not_found() {
        let service = service_with(Arc::new(InMemorySessionRepository::new()));
        let result = service.update_session("missing", request()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_and_remove_route() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service = service_with(repo.clone());
        let session = service.log_session(request(), now()).await.unwrap();

        let updated = service
            .add_route(
                &session.id,
                RouteInput {
                    difficulty: Some(SportGrade::Yds11a.into()),
                    result: Some(ResultKind::Send),
                    ..RouteInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.routes.len(), 3);
        assert_eq!(updated.next_route_type(), ClimbingType::Sport);

        let route_id = updated.routes[2].id.clone();
        let (removed, after) = service.remove_route(&session.id, &route_id).await.unwrap();
        assert_eq!(removed.id, route_id);
        assert_eq!(after.routes.len(), 2);
        assert_eq!(after.next_route_type(), ClimbingType::Bouldering);

        let missing = service.remove_route(&session.id, "nope").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_route_with_duplicate_id_gets_fresh_id() {
        let service = service_with(Arc::new(InMemorySessionRepository::new()));
        let session = service.log_session(request(), now()).await.unwrap();
        let existing_id = session.routes[0].id.clone();

        let updated = service
            .add_route(
                &session.id,
                RouteInput {
                    id: Some(existing_id.clone()),
                    ..RouteInput::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.routes[2].id, existing_id);
    }

    #[tokio::test]
    async fn test_update_keeps_known_route_ids_once() {
        let service = service_with(Arc::new(InMemorySessionRepository::new()));
        let session = service.log_session(request(), now()).await.unwrap();
        let kept_id = session.routes[0].id.clone();

        let mut edit = request();
        edit.routes = vec![
            RouteInput {
                id: Some(kept_id.clone()),
                ..RouteInput::default()
            },
            RouteInput {
                id: Some(kept_id.clone()),
                ..RouteInput::default()
            },
            RouteInput {
                id: Some("foreign-route".to_string()),
                ..RouteInput::default()
            },
        ];
        let updated = service.update_session(&session.id, edit).await.unwrap();

        let ids: HashSet<&str> = updated.routes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(updated.routes[0].id, kept_id);
        assert!(!ids.contains("foreign-route"));
    }

    #[tokio::test]
    async fn test_delete_session() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service = service_with(repo.clone());
        let session = service.log_session(request(), now()).await.unwrap();

        service.delete_session(&session.id).await.unwrap();
        assert_eq!(repo.session_count().await, 0);

        let again = service.delete_session(&session.id).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_persistence_failure_is_reported() {
        let service = SessionService::new(
            Arc::new(FailingSessionRepository),
            Arc::new(AppConfig::default()),
        );

        let result = service.log_session(request(), now()).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }
}
