//! HTTP surface over the stored snapshots.
use crate::core::snapshot::LAST_MODIFIED;
use crate::core::{PriceSnapshot, SnapshotKind, SnapshotStore};
use crate::sync::SnapshotSync;
use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    sync: SnapshotSync,
    // Held for the duration of a sync so triggers never interleave writes
    update_lock: Mutex<()>,
}

impl AppState {
    pub fn new(sync: SnapshotSync) -> Self {
        AppState {
            sync,
            update_lock: Mutex::new(()),
        }
    }
}

/// Renders as a JSON `{"error": "..."}` response.
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "Request failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub current: PriceSnapshot,
    pub previous: PriceSnapshot,
    pub current_last_modified: Option<Value>,
    pub previous_last_modified: Option<Value>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/prices", get(get_prices))
        .route(
            "/trigger-update",
            post(trigger_update).fallback(post_required),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `bind` and serves until Ctrl-C.
pub async fn serve(state: Arc<AppState>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Received Ctrl-C, shutting down");
        })
        .await
        .context("Server exited with an error")
}

/// GET /api/prices
///
/// Returns both stored snapshots and their `last_modified` values.
async fn get_prices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PricesResponse>, AppError> {
    let store = state.sync.store();
    let current = store.load(SnapshotKind::Current)?;
    let previous = store.load(SnapshotKind::Previous)?;

    Ok(Json(PricesResponse {
        current_last_modified: current.get(LAST_MODIFIED).cloned(),
        previous_last_modified: previous.get(LAST_MODIFIED).cloned(),
        current,
        previous,
    }))
}

/// POST /trigger-update
///
/// Runs a full sync before answering.
async fn trigger_update(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let _guard = state.update_lock.lock().await;
    match state.sync.run().await {
        Ok(report) => {
            info!(?report, "Triggered update finished");
            (StatusCode::OK, Json(json!({ "message": "update started" })))
        }
        Err(e) => {
            error!(error = ?e, "Triggered update failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "update failed" })),
            )
        }
    }
}

async fn post_required() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "POST required" })),
    )
}
