use crate::routes::error::ErrorEnvelope;
use crate::routes::events::{
    CountQuery, ListEventsQuery, LocationRecommendationsQuery, LocationRecommendationsResponse,
    MessageResponse, RecommendationsQuery, RecommendationsResponse, TrackSearchInput,
    UpdateStatusInput,
};
use crate::routes::health::{HealthResponse, PingResponse};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use civic_core::types::{
    Category, CreateEventInput, EventId, EventRecord, EventSearch, EventStatus, UpdateEventInput,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::events::create_event,
        crate::routes::events::list_events,
        crate::routes::events::get_event,
        crate::routes::events::update_event,
        crate::routes::events::update_status,
        crate::routes::events::delete_event,
        crate::routes::events::all_events,
        crate::routes::events::search_events,
        crate::routes::events::recommendations,
        crate::routes::events::location_recommendations,
        crate::routes::events::track_search,
        crate::routes::events::recently_viewed,
        crate::routes::events::upcoming,
        crate::routes::events::categories,
        crate::routes::health::ping,
        crate::routes::health::health
    ),
    components(schemas(
        EventRecord,
        EventId,
        Category,
        EventStatus,
        CreateEventInput,
        UpdateEventInput,
        EventSearch,
        ListEventsQuery,
        CountQuery,
        RecommendationsQuery,
        LocationRecommendationsQuery,
        TrackSearchInput,
        UpdateStatusInput,
        MessageResponse,
        RecommendationsResponse,
        LocationRecommendationsResponse,
        PingResponse,
        HealthResponse,
        ErrorEnvelope
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn swagger_ui() -> impl IntoResponse {
    let html = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Civic Events API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      window.ui = SwaggerUIBundle({ url: '/api/openapi.json', dom_id: '#swagger-ui' });
    </script>
  </body>
</html>
"#;
    axum::response::Html(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_event_routes() {
        let spec: serde_json::Value = serde_json::from_str(&generate_spec()).unwrap();
        let paths = spec["paths"].as_object().unwrap();
        for path in [
            "/api/events",
            "/api/events/{id}",
            "/api/events/recommendations",
            "/api/events/recommendations/location",
            "/api/health/ping",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
