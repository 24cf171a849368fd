// HTTP surface of the marketplace - one axum router over shared
// application state, with one handler module per resource.

pub mod assistant;
pub mod centers;
pub mod consumers;
pub mod producers;
pub mod quotes;
pub mod types;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rusqlite::Connection;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::assistant::AssistantClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    assistant: Option<Arc<AssistantClient>>,
}

impl AppState {
    pub fn new(conn: Connection, assistant: Option<AssistantClient>) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
            assistant: assistant.map(Arc::new),
        }
    }

    /// Every store access goes through this lock, which is what makes each
    /// transfer's read-validate-write sequence atomic with respect to
    /// concurrent requests. Held only for synchronous work, never across
    /// an await.
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().expect("database mutex poisoned")
    }

    pub(crate) fn assistant(&self) -> Option<Arc<AssistantClient>> {
        self.assistant.clone()
    }
}

/// GET /health - liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/centers", get(centers::get_centers))
        .route("/centers/transfer", post(centers::create_transfer))
        .route("/centers/transfers", get(centers::get_transfers))
        .route(
            "/consumers",
            get(consumers::get_consumers).post(consumers::create_consumer),
        )
        .route("/consumers/:id", put(consumers::update_consumer))
        .route(
            "/producers",
            get(producers::get_producers).post(producers::create_producer),
        )
        .route("/producers/:id", put(producers::update_producer))
        .route("/quotes/connection", get(quotes::get_connection_quote))
        .route("/assistant/chat", post(assistant::chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the address and serves the API until the process stops.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Fresh state over an in-memory database with the demo centers seeded.
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let mut conn = Connection::open_in_memory().unwrap();
    crate::db::setup_database(&conn).unwrap();
    crate::db::seed_energy_centers_if_empty(&mut conn).unwrap();
    AppState::new(conn, None)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let app = router(test_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = router(test_state());

        let req = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
