use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::SessionService,
    types::{QuickLogRequest, RouteInput, SessionRequest, SessionResponse},
};
use crate::shared::{AppError, AppState};

fn service(state: &AppState) -> SessionService {
    SessionService::new(
        Arc::clone(&state.session_repository),
        Arc::clone(&state.config),
    )
}

/// HTTP handler for listing every logged session
///
/// GET /sessions
#[instrument(name = "list_sessions", skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let sessions = service(&state).list_sessions().await?;

    info!(session_count = sessions.len(), "Sessions listed");
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// HTTP handler for logging a full session
///
/// POST /sessions
#[instrument(name = "log_session", skip(state, request))]
pub async fn log_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = service(&state).log_session(request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// HTTP handler for a one-tap session log
///
/// POST /sessions/quick
#[instrument(name = "quick_log", skip(state, request))]
pub async fn quick_log(
    State(state): State<AppState>,
    request: Option<Json<QuickLogRequest>>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let request = request.map(|Json(body)| body).unwrap_or_default();
    let session = service(&state).quick_log(request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// GET /sessions/:id
#[instrument(name = "get_session", skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = service(&state).get_session(&session_id).await?;
    Ok(Json(session.into()))
}

/// PUT /sessions/:id
#[instrument(name = "update_session", skip(state, request))]
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = service(&state)
        .update_session(&session_id, request)
        .await?;
    Ok(Json(session.into()))
}

/// DELETE /sessions/:id
#[instrument(name = "delete_session", skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    service(&state).delete_session(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sessions/:id/routes
#[instrument(name = "add_route", skip(state, route))]
pub async fn add_route(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(route): Json<RouteInput>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = service(&state).add_route(&session_id, route).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// DELETE /sessions/:id/routes/:route_id
#[instrument(name = "remove_route", skip(state))]
pub async fn remove_route(
    State(state): State<AppState>,
    Path((session_id, route_id)): Path<(String, String)>,
) -> Result<Json<SessionResponse>, AppError> {
    let (_, session) = service(&state)
        .remove_route(&session_id, &route_id)
        .await?;
    Ok(Json(session.into()))
}
