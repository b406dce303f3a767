use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{AppState, build_store};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use civic_core::events::EventRepository;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct PingResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    indexed_events: usize,
    stored_events: u64,
    timestamp: DateTime<Utc>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ping", get(ping))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/health/ping",
    responses((status = 200, body = PingResponse))
)]
pub(crate) async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, body = HealthResponse))
)]
pub(crate) async fn health(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
) -> Response {
    let stored = build_store(&state).and_then(|db| db.events().count());
    match stored {
        Ok(stored_events) => Json(HealthResponse {
            status: "healthy",
            indexed_events: state.events.len(),
            stored_events,
            timestamp: Utc::now(),
        })
        .into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}
