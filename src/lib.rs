// Library crate for the climbing journal server
// This file exposes the public API for integration tests

pub mod config;
pub mod grades;
pub mod session;
pub mod shared;
pub mod stats;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use grades::{BoulderingGrade, ClimbingType, Difficulty, SportGrade};
pub use session::{InMemorySessionRepository, SessionRecord, SessionRepository};
pub use shared::{AppError, AppState};
pub use stats::{DateWindow, StatsSummary};

/// Builds the HTTP router over `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/sessions",
            get(session::list_sessions).post(session::log_session),
        )
        .route("/sessions/quick", post(session::quick_log))
        .route(
            "/sessions/:id",
            get(session::get_session)
                .put(session::update_session)
                .delete(session::delete_session),
        )
        .route("/sessions/:id/routes", post(session::add_route))
        .route(
            "/sessions/:id/routes/:route_id",
            delete(session::remove_route),
        )
        .route("/stats/summary", get(stats::handlers::summary))
        .route("/stats/progression", get(stats::handlers::progression))
        .route("/stats/distribution", get(stats::handlers::distribution))
        .route("/stats/calendar", get(stats::handlers::calendar))
        .route("/stats/today", get(stats::handlers::today))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
