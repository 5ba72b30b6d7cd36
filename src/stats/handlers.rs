use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::StatsSummary,
    service::StatsService,
    types::{
        CalendarQuery, CalendarResponse, DistributionResponse, ProgressionResponse, StatsQuery,
        TodayResponse,
    },
};
use crate::{
    config::offset_from_minutes,
    shared::{AppError, AppState},
};

fn service(state: &AppState) -> StatsService {
    StatsService::new(
        Arc::clone(&state.session_repository),
        Arc::clone(&state.config),
    )
}

/// HTTP handler for the dashboard summary of one window
///
/// GET /stats/summary
#[instrument(name = "stats_summary", skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsSummary>, AppError> {
    let tz = query.offset(state.config.tz_offset_minutes);
    let window = query.window(Utc::now(), &tz)?;
    let summary = service(&state).summary(window, tz).await?;

    info!(
        session_count = summary.session_count,
        period = ?query.period,
        "Summary computed"
    );
    Ok(Json(summary))
}

/// GET /stats/progression
#[instrument(name = "stats_progression", skip(state))]
pub async fn progression(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ProgressionResponse>, AppError> {
    let tz = query.offset(state.config.tz_offset_minutes);
    let window = query.window(Utc::now(), &tz)?;
    let climbing_type = query.climbing_type();
    let points = service(&state).progression(window, climbing_type).await?;

    Ok(Json(ProgressionResponse {
        climbing_type,
        points,
    }))
}

/// GET /stats/distribution
#[instrument(name = "stats_distribution", skip(state))]
pub async fn distribution(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DistributionResponse>, AppError> {
    let tz = query.offset(state.config.tz_offset_minutes);
    let window = query.window(Utc::now(), &tz)?;
    let climbing_type = query.climbing_type();
    let buckets = service(&state).distribution(window, climbing_type).await?;

    Ok(Json(DistributionResponse {
        climbing_type,
        buckets,
    }))
}

/// GET /stats/calendar
#[instrument(name = "stats_calendar", skip(state))]
pub async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let tz = query
        .tz_offset_minutes
        .map(offset_from_minutes)
        .unwrap_or_else(|| state.config.default_offset());
    let (year, month) = query.year_month(Utc::now(), &tz)?;
    let days = service(&state).calendar(year, month, tz).await?;

    Ok(Json(CalendarResponse { year, month, days }))
}

/// GET /stats/today
#[instrument(name = "stats_today", skip(state))]
pub async fn today(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<TodayResponse>, AppError> {
    let tz = query.offset(state.config.tz_offset_minutes);
    let logged_today = service(&state)
        .logged_today(Utc::now().with_timezone(&tz))
        .await?;

    Ok(Json(TodayResponse { logged_today }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::{BoulderingGrade, SportGrade};
    use crate::session::models::{Environment, ResultKind, RouteRecord, SessionRecord};
    use crate::session::repository::InMemorySessionRepository;
    use crate::shared::test_utils::{AppStateBuilder, FailingSessionRepository};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use chrono::TimeZone;
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/stats/summary", get(summary))
            .route("/stats/progression", get(progression))
            .route("/stats/distribution", get(distribution))
            .route("/stats/calendar", get(calendar))
            .route("/stats/today", get(today))
            .with_state(state)
    }

    fn sessions() -> Vec<SessionRecord> {
        vec![
            SessionRecord::new(Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap(), 60, "good")
                .with_environment(Environment::Indoor)
                .with_location("Movement")
                .with_route(RouteRecord::new(
                    Some(BoulderingGrade::V4.into()),
                    Some(ResultKind::Send),
                ))
                .with_route(
                    RouteRecord::new(Some(BoulderingGrade::V6.into()), Some(ResultKind::Fail))
                        .with_attempts(5),
                ),
            SessionRecord::new(Utc.with_ymd_and_hms(2024, 4, 2, 18, 0, 0).unwrap(), 120, "tired")
                .with_environment(Environment::Outdoor)
                .with_location("Red River Gorge")
                .with_route(RouteRecord::new(
                    Some(SportGrade::Yds11b.into()),
                    Some(ResultKind::Onsight),
                )),
        ]
    }

    fn seeded_state() -> AppState {
        AppStateBuilder::new()
            .with_session_repository(Arc::new(InMemorySessionRepository::with_sessions(
                sessions(),
            )))
            .build()
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_summary_all_time() {
        let (status, json) = get_json(app(seeded_state()), "/stats/summary").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["session_count"], 2);
        assert_eq!(json["total_hours"], 3.0);
        assert_eq!(json["highest_bouldering"], "V4");
        assert_eq!(json["highest_sport"], "5.11b");
        assert_eq!(json["highest_overall"], "5.11b");
        assert_eq!(json["indoor_outdoor"]["outdoor"], 1);
        assert!(json["start"].is_null());
    }

    #[tokio::test]
    async fn test_summary_for_month() {
        let (status, json) = get_json(
            app(seeded_state()),
            "/stats/summary?period=month&anchor=2024-03-15",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["session_count"], 1);
        assert_eq!(json["highest_sport"], "-");
        assert_eq!(json["start"], "2024-03-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_summary_rejects_incomplete_custom_window() {
        let (status, json) = get_json(
            app(seeded_state()),
            "/stats/summary?period=custom&start=2024-03-01",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("start and end"));
    }

    #[tokio::test]
    async fn test_summary_rejects_anchor_at_end_of_calendar() {
        for period in ["week", "month", "year"] {
            let uri = format!("/stats/summary?period={}&anchor=%2B262142-12-31", period);
            let (status, json) = get_json(app(seeded_state()), &uri).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "period {}", period);
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_progression_by_type() {
        let (status, json) = get_json(
            app(seeded_state()),
            "/stats/progression?climbing_type=sport",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["climbing_type"], "sport");
        assert_eq!(json["points"].as_array().unwrap().len(), 1);
        assert_eq!(json["points"][0]["result"], "onsight");
    }

    #[tokio::test]
    async fn test_distribution_defaults_to_bouldering() {
        let (status, json) = get_json(app(seeded_state()), "/stats/distribution").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["climbing_type"], "bouldering");
        let buckets = json["buckets"].as_array().unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0]["grade"]["grade"], "V6");
        assert_eq!(buckets[0]["result"], "fail");
    }

    #[tokio::test]
    async fn test_calendar_month() {
        let (status, json) = get_json(
            app(seeded_state()),
            "/stats/calendar?year=2024&month=4",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let days = json["days"].as_array().unwrap();
        assert_eq!(days.len(), 30);
        assert_eq!(days[1]["sessions"], 1);
        assert_eq!(days[1]["minutes"], 120);
    }

    #[tokio::test]
    async fn test_calendar_rejects_bad_month() {
        let (status, _) = get_json(app(seeded_state()), "/stats/calendar?month=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_today_without_sessions() {
        let state = AppStateBuilder::new().build();
        let (status, json) = get_json(app(state), "/stats/today").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["logged_today"], false);
    }

    #[tokio::test]
    async fn test_today_after_logging() {
        let repo = InMemorySessionRepository::with_sessions(vec![SessionRecord::new(
            Utc::now(),
            30,
            "good",
        )]);
        let state = AppStateBuilder::new()
            .with_session_repository(Arc::new(repo))
            .build();

        let (_, json) = get_json(app(state), "/stats/today").await;
        assert_eq!(json["logged_today"], true);
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let state = AppStateBuilder::new()
            .with_session_repository(Arc::new(FailingSessionRepository))
            .build();

        let (status, _) = get_json(app(state), "/stats/summary").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
