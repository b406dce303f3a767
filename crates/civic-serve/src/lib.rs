pub mod config;
pub mod middleware;
pub mod openapi;
pub mod routes;

use axum::Router;
use axum::http::HeaderValue;
use civic_core::events::EventRepository;
use civic_core::seed::demo_events;
use civic_core::{CivicError, EventStore};
use civic_db::schema;
use civic_db::store::DbStore;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub db_path: String,
    pub events: Arc<EventStore>,
    pub allowed_origins: Vec<String>,
    /// Serializes database writes with the matching store update so the index
    /// never disagrees with the table.
    writes: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(db_path: String, events: Arc<EventStore>, allowed_origins: Vec<String>) -> Self {
        Self {
            db_path,
            events,
            allowed_origins,
            writes: Arc::new(Mutex::new(())),
        }
    }

    pub(crate) fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.writes.lock()
    }
}

pub fn build_store(state: &AppState) -> Result<DbStore, CivicError> {
    open_store(&state.db_path)
}

fn open_store(db_path: &str) -> Result<DbStore, CivicError> {
    let conn = schema::open_and_migrate(db_path).map_err(|err| CivicError::Internal {
        message: err.to_string(),
    })?;
    Ok(DbStore::new(conn))
}

/// Builds the in-memory index from the database. When `seed_demo` is set and
/// the database holds no events, the demo dataset is persisted first so both
/// sides agree on it.
pub fn load_event_store(db_path: &str, seed_demo: bool) -> Result<EventStore, CivicError> {
    let db = open_store(db_path)?;
    let repo = db.events();
    if seed_demo && repo.count()? == 0 {
        let demos = demo_events(chrono::Utc::now());
        for event in &demos {
            repo.create(event)?;
        }
        info!(count = demos.len(), "persisted demo events");
    }
    let store = EventStore::new();
    store.seed(repo.list_all()?);
    info!(indexed = store.len(), "event index ready");
    Ok(store)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    async fn allowed_origin(allowed: &[&str], origin: &str) -> Option<String> {
        let state = AppState::new(
            "unused.db".to_string(),
            Arc::new(EventStore::new()),
            allowed.iter().map(|origin| (*origin).to_string()).collect(),
        );
        let request = Request::get("/api/health/ping")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|value| value.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn cors_allows_any_origin_without_allow_list() {
        let origin = allowed_origin(&[], "https://anywhere.example").await;
        assert_eq!(origin.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn cors_honours_allow_list_and_skips_invalid_entries() {
        let allowed = ["https://city.example", "bad\norigin"];
        let origin = allowed_origin(&allowed, "https://city.example").await;
        assert_eq!(origin.as_deref(), Some("https://city.example"));
        assert_eq!(allowed_origin(&allowed, "https://elsewhere.example").await, None);
    }

    #[test]
    fn load_seeds_demo_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.db");
        let path = path.to_str().unwrap();

        let first = load_event_store(path, true).unwrap();
        assert!(!first.is_empty());
        let second = load_event_store(path, true).unwrap();
        assert_eq!(second.len(), first.len());
    }

    #[test]
    fn load_without_demo_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.db");
        let store = load_event_store(path.to_str().unwrap(), false).unwrap();
        assert!(store.is_empty());
    }
}
