use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::routes::extract::ApiQuery;
use crate::{AppState, build_store};
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use civic_core::error::{CivicError, EventError};
use civic_core::events::EventRepository;
use civic_core::types::{
    Category, CreateEventInput, EventFilter, EventId, EventRecord, EventSearch, EventStatus,
    UpdateEventInput,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};
use utoipa::{IntoParams, ToSchema};

const LIST_LIMIT: u32 = 100;
const LIST_BUDGET: Duration = Duration::from_secs(30);
const DEFAULT_RECOMMENDATIONS: usize = 5;
const DEFAULT_RECENTLY_VIEWED: usize = 5;
const DEFAULT_UPCOMING: usize = 10;

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    status: Option<String>,
    category: Option<String>,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct CountQuery {
    count: Option<usize>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct RecommendationsQuery {
    count: Option<usize>,
    area: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct LocationRecommendationsQuery {
    count: Option<usize>,
    location: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TrackSearchInput {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusInput {
    status: EventStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationsResponse {
    message: String,
    count: usize,
    events: Vec<EventRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationRecommendationsResponse {
    message: String,
    count: usize,
    location: String,
    category: String,
    events: Vec<EventRecord>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", post(create_event).get(list_events))
        .route("/events/service/all", get(all_events))
        .route("/events/search", get(search_events))
        .route("/events/recommendations", get(recommendations))
        .route(
            "/events/recommendations/location",
            get(location_recommendations),
        )
        .route("/events/track-search", post(track_search))
        .route("/events/recently-viewed", get(recently_viewed))
        .route("/events/upcoming", get(upcoming))
        .route("/events/categories", get(categories))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{id}/status", put(update_status))
        .with_state(state)
}

fn parse_id(raw: &str) -> Result<EventId, CivicError> {
    EventId::from_str(raw).map_err(|err| CivicError::invalid_input(err.to_string()))
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventInput,
    responses((status = 201, body = EventRecord))
)]
pub(crate) async fn create_event(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateEventInput>,
) -> Response {
    if let Err(message) = input.validate() {
        return map_error(&CivicError::invalid_input(message), Some(correlation.0))
            .into_response();
    }
    let db = match build_store(&state) {
        Ok(db) => db,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let record = input.into_record(EventId::generate(), Utc::now());
    let record = {
        let _write = state.write_guard();
        if let Err(err) = db.events().create(&record) {
            return map_error(&err, Some(correlation.0)).into_response();
        }
        state.events.add_event(record)
    };
    info!(id = %record.id, title = %record.title, "event created");
    let location = format!("/api/events/{}", record.id);
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(record),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(ListEventsQuery),
    responses((status = 200, body = Vec<EventRecord>))
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    ApiQuery(query): ApiQuery<ListEventsQuery>,
) -> Response {
    let filter = EventFilter {
        status: lenient(query.status.as_deref(), "status", EventStatus::parse),
        category: lenient(query.category.as_deref(), "category", Category::parse),
        from_date: query.from_date,
        to_date: query.to_date,
        limit: Some(LIST_LIMIT),
    };
    let db_state = state.clone();
    let task = tokio::task::spawn_blocking(move || {
        build_store(&db_state).and_then(|db| db.events().list(&filter))
    });
    let result = match tokio::time::timeout(LIST_BUDGET, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(CivicError::internal(join_err.to_string())),
        Err(_) => Err(CivicError::Timeout),
    };
    match result {
        Ok(events) => Json(events).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

/// Unparseable filter values are dropped rather than rejected.
fn lenient<T>(raw: Option<&str>, name: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let raw = raw.filter(|value| !value.trim().is_empty())?;
    let parsed = parse(raw);
    if parsed.is_none() {
        debug!(%name, value = %raw, "ignoring unknown filter value");
    }
    parsed
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    responses((status = 200, body = EventRecord))
)]
pub(crate) async fn get_event(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    let found = parse_id(&id).and_then(|id| {
        state
            .events
            .get_event_by_id(&id)
            .ok_or(EventError::NotFound.into())
    });
    match found {
        Ok(event) => Json(event).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    request_body = UpdateEventInput,
    responses((status = 200, body = EventRecord))
)]
pub(crate) async fn update_event(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<UpdateEventInput>,
) -> Response {
    let result = modify(&state, &id, |current| {
        input
            .apply(current, Utc::now())
            .map_err(CivicError::invalid_input)
    });
    match result {
        Ok(event) => Json(event).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/events/{id}/status",
    params(("id" = String, Path, description = "Event ID")),
    request_body = UpdateStatusInput,
    responses((status = 200, body = EventRecord))
)]
pub(crate) async fn update_status(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<UpdateStatusInput>,
) -> Response {
    let result = modify(&state, &id, |current| {
        let mut next = current.clone();
        next.status = input.status;
        next.updated_at = Some(Utc::now());
        Ok(next)
    });
    match result {
        Ok(event) => Json(event).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

/// Loads the persisted record, applies `change`, writes it back and
/// reindexes it in the in-memory store. Records missing from the index stay
/// missing.
fn modify<F>(state: &AppState, raw_id: &str, change: F) -> Result<EventRecord, CivicError>
where
    F: FnOnce(&EventRecord) -> Result<EventRecord, CivicError>,
{
    let id = parse_id(raw_id)?;
    let db = build_store(state)?;
    let repo = db.events();
    let _write = state.write_guard();
    let current = repo.get(&id)?.ok_or(EventError::NotFound)?;
    let next = change(&current)?;
    repo.update(&next)?;
    if state.events.update_event(&id, next.clone()).is_none() {
        warn!(%id, "updated event is not indexed; leaving index unchanged");
    }
    info!(%id, "event updated");
    Ok(next)
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    responses((status = 204))
)]
pub(crate) async fn delete_event(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    let result = parse_id(&id).and_then(|id| {
        let db = build_store(&state)?;
        let _write = state.write_guard();
        if !db.events().delete(&id)? {
            return Err(EventError::NotFound.into());
        }
        state.events.remove_event(&id);
        info!(%id, "event deleted");
        Ok(())
    });
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events/service/all",
    responses((status = 200, body = Vec<EventRecord>))
)]
pub(crate) async fn all_events(State(state): State<AppState>) -> Json<Vec<EventRecord>> {
    Json(state.events.all_events())
}

#[utoipa::path(
    get,
    path = "/api/events/search",
    params(EventSearch),
    responses((status = 200, body = Vec<EventRecord>))
)]
pub(crate) async fn search_events(
    State(state): State<AppState>,
    ApiQuery(search): ApiQuery<EventSearch>,
) -> Json<Vec<EventRecord>> {
    Json(state.events.search_events(&search))
}

#[utoipa::path(
    get,
    path = "/api/events/recommendations",
    params(RecommendationsQuery),
    responses((status = 200, body = RecommendationsResponse))
)]
pub(crate) async fn recommendations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecommendationsQuery>,
) -> Json<RecommendationsResponse> {
    let count = query.count.unwrap_or(DEFAULT_RECOMMENDATIONS);
    let events = state.events.recommendations(count, query.area.as_deref());
    Json(RecommendationsResponse {
        message: "Based on your search history, you may like these events:".to_string(),
        count: events.len(),
        events,
    })
}

#[utoipa::path(
    get,
    path = "/api/events/recommendations/location",
    params(LocationRecommendationsQuery),
    responses((status = 200, body = LocationRecommendationsResponse))
)]
pub(crate) async fn location_recommendations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LocationRecommendationsQuery>,
) -> Json<LocationRecommendationsResponse> {
    let count = query.count.unwrap_or(DEFAULT_RECOMMENDATIONS);
    let location = query.location.unwrap_or_default();
    let category = query.category.unwrap_or_default();
    let events = state
        .events
        .location_recommendations(count, &location, Some(category.as_str()));
    let scope = if category.trim().is_empty() || category.trim().eq_ignore_ascii_case("all") {
        String::new()
    } else {
        format!(" in {category} category")
    };
    Json(LocationRecommendationsResponse {
        message: format!("Events recommended for {location}{scope}"),
        count: events.len(),
        location,
        category,
        events,
    })
}

#[utoipa::path(
    post,
    path = "/api/events/track-search",
    request_body = TrackSearchInput,
    responses((status = 200, body = MessageResponse))
)]
pub(crate) async fn track_search(
    State(state): State<AppState>,
    Json(input): Json<TrackSearchInput>,
) -> Json<MessageResponse> {
    state.events.track_search(&input.query);
    Json(MessageResponse {
        message: "Search tracked successfully".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/events/recently-viewed",
    params(CountQuery),
    responses((status = 200, body = Vec<EventRecord>))
)]
pub(crate) async fn recently_viewed(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CountQuery>,
) -> Json<Vec<EventRecord>> {
    Json(
        state
            .events
            .recently_viewed(query.count.unwrap_or(DEFAULT_RECENTLY_VIEWED)),
    )
}

#[utoipa::path(
    get,
    path = "/api/events/upcoming",
    params(CountQuery),
    responses((status = 200, body = Vec<EventRecord>))
)]
pub(crate) async fn upcoming(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CountQuery>,
) -> Json<Vec<EventRecord>> {
    Json(
        state
            .events
            .upcoming_events(query.count.unwrap_or(DEFAULT_UPCOMING)),
    )
}

#[utoipa::path(
    get,
    path = "/api/events/categories",
    responses((status = 200, body = Vec<String>))
)]
pub(crate) async fn categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.events.categories())
}

#[cfg(test)]
mod tests {
    use crate::{AppState, app};
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use chrono::{Duration, Utc};
    use civic_core::EventStore;
    use civic_core::types::EventId;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Harness {
        _dir: TempDir,
        state: AppState,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let db_path = dir.path().join("events.db").to_str().unwrap().to_string();
            let state = AppState::new(db_path, Arc::new(EventStore::new()), Vec::new());
            Self { _dir: dir, state }
        }

        fn app(&self) -> Router {
            app(self.state.clone())
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.app().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }

        async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Request::get(uri).body(Body::empty()).unwrap()).await
        }

        async fn json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }

        async fn create(&self, title: &str, category: &str, location: &str, days: i64) -> Value {
            let starts_at = Utc::now() + Duration::days(days);
            let (status, body) = self
                .json(
                    "POST",
                    "/api/events",
                    json!({
                        "title": title,
                        "description": format!("{title} for everyone"),
                        "startsAt": starts_at,
                        "location": location,
                        "category": category,
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body
        }
    }

    fn titles(body: &Value) -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|event| event["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn create_persists_and_indexes() {
        let harness = Harness::new();
        let created = harness.create("Clean-Up", "Community", "Beachfront", 2).await;
        assert_eq!(created["status"], "Published");
        let id = created["id"].as_str().unwrap();

        let (status, fetched) = harness.get(&format!("/api/events/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (_, listed) = harness.get("/api/events").await;
        assert_eq!(titles(&listed), vec!["Clean-Up"]);
        let (_, viewed) = harness.get("/api/events/recently-viewed").await;
        assert_eq!(titles(&viewed), vec!["Clean-Up"]);
    }

    #[tokio::test]
    async fn create_rejects_inverted_window() {
        let harness = Harness::new();
        let starts_at = Utc::now() + Duration::days(2);
        let (status, body) = harness
            .json(
                "POST",
                "/api/events",
                json!({
                    "title": "Backwards",
                    "description": "",
                    "startsAt": starts_at,
                    "endsAt": starts_at - Duration::hours(1),
                    "location": "Hall",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_input");
        assert!(body["correlation_id"].as_str().unwrap().starts_with("corr_"));
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids() {
        let harness = Harness::new();
        let (status, body) = harness.get("/api/events/not-an-id").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_input");

        let missing = EventId::generate();
        let (status, body) = harness.get(&format!("/api/events/{missing}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn update_reindexes_store() {
        let harness = Harness::new();
        harness.create("Other", "Government", "Hall", 2).await;
        let created = harness.create("Hearing", "Government", "Hall", 1).await;
        let id = created["id"].as_str().unwrap();

        let moved = Utc::now() + Duration::days(5);
        let (status, updated) = harness
            .json(
                "PUT",
                &format!("/api/events/{id}"),
                json!({ "title": "Hearing (moved)", "startsAt": moved, "category": "Health" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], created["id"]);
        assert!(updated["updatedAt"].is_string());

        let (_, all) = harness.get("/api/events/service/all").await;
        assert_eq!(titles(&all), vec!["Other", "Hearing (moved)"]);
        let (_, categories) = harness.get("/api/events/categories").await;
        assert_eq!(categories, json!(["Government", "Health"]));
    }

    #[tokio::test]
    async fn status_update_and_delete() {
        let harness = Harness::new();
        let created = harness.create("Fair", "Community", "Market", 3).await;
        let id = created["id"].as_str().unwrap();

        let (status, updated) = harness
            .json("PUT", &format!("/api/events/{id}/status"), json!({ "status": "Cancelled" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "Cancelled");

        let (_, cancelled) = harness.get("/api/events?status=cancelled").await;
        assert_eq!(titles(&cancelled), vec!["Fair"]);

        let request = Request::delete(format!("/api/events/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = harness.send(request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = harness.get(&format!("/api/events/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, upcoming) = harness.get("/api/events/upcoming").await;
        assert!(upcoming.as_array().unwrap().is_empty());

        let request = Request::delete(format!("/api/events/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = harness.send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_does_not_reindex_a_removed_event() {
        let harness = Harness::new();
        let created = harness.create("Hearing", "Government", "Hall", 1).await;
        let raw = created["id"].as_str().unwrap();
        let id: EventId = raw.parse().unwrap();
        harness.state.events.remove_event(&id);

        let (status, updated) = harness
            .json("PUT", &format!("/api/events/{raw}"), json!({ "title": "Hearing (late)" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Hearing (late)");

        assert!(harness.state.events.is_empty());
        let (_, all) = harness.get("/api/events/service/all").await;
        assert!(all.as_array().unwrap().is_empty());
        let (_, upcoming) = harness.get("/api/events/upcoming").await;
        assert!(upcoming.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_query_uses_error_envelope() {
        let harness = Harness::new();
        for uri in [
            "/api/events/upcoming?count=many",
            "/api/events/recommendations?count=-1",
            "/api/events/search?startDate=tomorrow",
            "/api/events?fromDate=yesterday",
        ] {
            let (status, body) = harness.get(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["code"], "invalid_input", "{uri}");
            assert!(body["correlation_id"].as_str().unwrap().starts_with("corr_"));
        }
    }

    #[tokio::test]
    async fn list_ignores_unknown_filters() {
        let harness = Harness::new();
        harness.create("Screening", "Health", "Clinic", 1).await;
        harness.create("Walk", "Recreation", "Park", 2).await;

        let (_, health) = harness.get("/api/events?category=health").await;
        assert_eq!(titles(&health), vec!["Screening"]);
        let (_, everything) = harness.get("/api/events?category=sports&status=bogus").await;
        assert_eq!(titles(&everything), vec!["Screening", "Walk"]);
    }

    #[tokio::test]
    async fn search_tracks_terms_for_recommendations() {
        let harness = Harness::new();
        harness.create("Garden Launch", "Community", "Phoenix Community Park", 1).await;
        harness.create("Free Screening", "Health", "Umlazi", 6).await;

        let (status, found) = harness.get("/api/events/search?query=screening").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&found), vec!["Free Screening"]);

        let (status, _) = harness
            .json("POST", "/api/events/track-search", json!({ "query": "Health" }))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, recommended) = harness.get("/api/events/recommendations?count=2").await;
        assert_eq!(recommended["count"], 2);
        assert_eq!(
            titles(&recommended["events"]),
            vec!["Free Screening", "Garden Launch"]
        );
    }

    #[tokio::test]
    async fn location_recommendations_envelope() {
        let harness = Harness::new();
        harness.create("Garden Launch", "Community", "Phoenix Community Park", 4).await;
        harness.create("Park Picnic", "Community", "Phoenix Community Park", 2).await;
        harness.create("Clean-Up", "Community", "Durban Beachfront", 1).await;

        let (status, body) = harness
            .get("/api/events/recommendations/location?count=3&location=Phoenix&category=Community")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Events recommended for Phoenix in Community category");
        assert_eq!(body["count"], 2);
        assert_eq!(titles(&body["events"]), vec!["Park Picnic", "Garden Launch"]);
    }

    #[tokio::test]
    async fn health_reports_counts_and_echoes_correlation() {
        let harness = Harness::new();
        harness.create("Walk", "Recreation", "Park", 2).await;
        let request = Request::get("/api/health")
            .header("x-correlation-id", "corr_test")
            .body(Body::empty())
            .unwrap();
        let response = harness.app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-correlation-id"], "corr_test");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["indexedEvents"], 1);
        assert_eq!(body["storedEvents"], 1);
    }
}
