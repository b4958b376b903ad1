//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate, Timelike};
use tracing::{error, info, warn};

use crate::domain::ScheduleTime;
use crate::planner::PlanRequest;
use crate::schedule::ReloadError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/stops/:stop_id", get(stop_details))
        .route("/journey/plan", get(plan_journey))
        .route("/admin/reload", post(reload))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The schedule generation currently served.
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse::from_store(&state.schedule.current()))
}

/// A stop with its parent station and child stops.
async fn stop_details(
    State(state): State<AppState>,
    Path(stop_id): Path<String>,
) -> Result<Json<StopResult>, AppError> {
    let store = state.schedule.current();
    store
        .stop_by_id(&stop_id)
        .and_then(|stop| StopResult::resolve(stop, &*store))
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown stop: {stop_id}"),
        })
}

/// Plan journeys between two stops.
async fn plan_journey(
    State(state): State<AppState>,
    Query(query): Query<PlanJourneyQuery>,
) -> Result<Json<PlanJourneyResponse>, AppError> {
    let now = Local::now();

    let date = match &query.date {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| AppError::BadRequest {
            message: format!("Invalid date: {date}"),
        })?,
        None => now.date_naive(),
    };

    let departure = match &query.time {
        Some(time) => ScheduleTime::parse(time).map_err(|e| AppError::BadRequest {
            message: format!("Invalid time {time}: {e}"),
        })?,
        None => ScheduleTime::from_secs(now.time().num_seconds_from_midnight()),
    };

    let mut request = PlanRequest::new(query.from, query.to, date, departure);
    request.max_transfers = query.max_transfers;
    request.max_alternatives = query.max_alternatives;

    // Pin one generation for both the search and the response
    let store = state.schedule.current();
    let planner = state.planner.clone();
    let search_store = store.clone();
    let outcome = tokio::task::spawn_blocking(move || planner.plan(&search_store, &request))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Planner task failed: {e}"),
        })?;

    let journeys = outcome
        .journeys
        .iter()
        .map(|journey| JourneyResult::from_journey(journey, &*store))
        .collect();

    Ok(Json(PlanJourneyResponse {
        journeys,
        empty_reason: outcome.empty_reason.map(|reason| reason.as_str()),
        generation: outcome.generation,
    }))
}

/// Rebuild the schedule from the feed file and swap it in.
async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let handle = state.schedule.clone();
    let path = state.feed_path.clone();

    let generation = tokio::task::spawn_blocking(move || handle.reload_from(path.as_path()))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Reload task failed: {e}"),
        })?
        .map_err(AppError::from)?;

    info!(generation, "Reload requested over HTTP completed");
    Ok(Json(ReloadResponse { generation }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    ReloadFailed { message: String },
    Internal { message: String },
}

impl From<ReloadError> for AppError {
    fn from(e: ReloadError) -> Self {
        AppError::ReloadFailed {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::ReloadFailed { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    use crate::planner::SearchConfig;
    use crate::schedule::{ScheduleFeed, ScheduleHandle, StopTimeRow};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn row(stop: &str, time: &str) -> StopTimeRow {
        let time = ScheduleTime::parse(time).unwrap();
        StopTimeRow::new(stop, time, time)
    }

    fn feed(last_arrival: &str) -> ScheduleFeed {
        ScheduleFeed::builder()
            .stop("A", "Alpha")
            .stop("B", "Bravo")
            .child_stop("B1", "Bravo stand 1", "B")
            .daily_service("D", day(), day())
            .trip("T1", "R", "D", vec![row("A", "08:00"), row("B", last_arrival)])
            .build()
    }

    fn state_with_path(feed_path: PathBuf) -> AppState {
        let handle = ScheduleHandle::from_feed(&feed("08:20")).unwrap();
        AppState::new(handle, SearchConfig::default(), feed_path)
    }

    fn state() -> AppState {
        state_with_path(PathBuf::from("/nonexistent/feed.json"))
    }

    fn query(from: &str, to: &str, date: Option<&str>, time: Option<&str>) -> PlanJourneyQuery {
        PlanJourneyQuery {
            from: from.to_string(),
            to: to.to_string(),
            date: date.map(str::to_string),
            time: time.map(str::to_string),
            max_transfers: None,
            max_alternatives: None,
        }
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn status_reports_generation() {
        let Json(status) = status(State(state())).await;
        assert_eq!(status.generation, 1);
        assert_eq!(status.stops, 3);
        assert_eq!(status.trips, 1);
    }

    #[tokio::test]
    async fn plans_a_journey() {
        let Json(response) = plan_journey(
            State(state()),
            Query(query("A", "B", Some("2024-03-15"), Some("07:55"))),
        )
        .await
        .unwrap();

        assert_eq!(response.generation, 1);
        assert_eq!(response.empty_reason, None);
        assert_eq!(response.journeys.len(), 1);
        assert_eq!(response.journeys[0].arrival_time, "08:20:00");
    }

    #[tokio::test]
    async fn unknown_stop_is_an_empty_result() {
        let Json(response) = plan_journey(
            State(state()),
            Query(query("A", "NOWHERE", Some("2024-03-15"), Some("07:55"))),
        )
        .await
        .unwrap();

        assert!(response.journeys.is_empty());
        assert_eq!(response.empty_reason, Some("unknown_stop"));
    }

    #[tokio::test]
    async fn stop_details_include_station_grouping() {
        let Json(station) = stop_details(State(state()), Path("B".to_string()))
            .await
            .unwrap();
        assert_eq!(station.name, "Bravo");
        assert_eq!(station.parent, None);
        assert_eq!(station.children.len(), 1);
        assert_eq!(station.children[0].stop_id, "B1");

        let Json(stand) = stop_details(State(state()), Path("B1".to_string()))
            .await
            .unwrap();
        assert_eq!(stand.parent.map(|p| p.name).as_deref(), Some("Bravo"));

        let missing = stop_details(State(state()), Path("NOWHERE".to_string())).await;
        assert!(matches!(missing, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn malformed_date_and_time_are_rejected() {
        let bad_date = plan_journey(
            State(state()),
            Query(query("A", "B", Some("15/03/2024"), Some("07:55"))),
        )
        .await;
        assert!(matches!(bad_date, Err(AppError::BadRequest { .. })));

        let bad_time = plan_journey(
            State(state()),
            Query(query("A", "B", Some("2024-03-15"), Some("7h55"))),
        )
        .await;
        assert!(matches!(bad_time, Err(AppError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn reload_swaps_generation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(serde_json::to_string(&feed("08:10")).unwrap().as_bytes())
            .unwrap();

        let state = state_with_path(path);
        let Json(reloaded) = reload(State(state.clone())).await.unwrap();
        assert_eq!(reloaded.generation, 2);

        let Json(response) = plan_journey(
            State(state),
            Query(query("A", "B", Some("2024-03-15"), Some("07:55"))),
        )
        .await
        .unwrap();
        assert_eq!(response.generation, 2);
        assert_eq!(response.journeys[0].arrival_time, "08:10:00");
    }

    #[tokio::test]
    async fn failed_reload_keeps_serving() {
        let state = state();
        let result = reload(State(state.clone())).await;

        assert!(matches!(result, Err(AppError::ReloadFailed { .. })));
        assert_eq!(state.schedule.generation(), 1);
    }

    #[test]
    fn error_status_codes() {
        let response = AppError::BadRequest {
            message: "nope".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::ReloadFailed {
            message: "bad feed".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = AppError::NotFound {
            message: "no such stop".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
