//! HTTP API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tokio::sync::watch;

use crate::watch::{ServiceReport, StackSnapshot};

/// Application state shared with handlers.
///
/// Handlers read the watcher's latest snapshot; they never probe anything
/// themselves.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Latest snapshot published by the health watcher.
    pub snapshot: watch::Receiver<StackSnapshot>,
}

impl AppState {
    /// Wrap a snapshot receiver.
    pub fn new(snapshot: watch::Receiver<StackSnapshot>) -> Self {
        Self { snapshot }
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> StackSnapshot {
        self.snapshot.borrow().clone()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether at least one health batch has completed.
    pub ready: bool,
}

/// Aggregated status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// "ok" while every service is reachable, "degraded" otherwise,
    /// "starting" before the first batch.
    pub status: &'static str,
    /// Per-service probe reports from the latest batch.
    pub services: Vec<ServiceReport>,
    /// Unix timestamp of the latest batch.
    pub checked_at_unix: i64,
}

/// Probe liveness handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness handler - 200 once the first health batch has completed.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.latest().is_populated();
    let response = ReadyResponse { ready: is_ready };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Aggregated status handler - the latest snapshot of the whole stack.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.latest();

    let status = if !snapshot.is_populated() {
        "starting"
    } else if snapshot.all_healthy() {
        "ok"
    } else {
        "degraded"
    };

    Json(StatusResponse {
        status,
        services: snapshot.services,
        checked_at_unix: snapshot.checked_at_unix,
    })
}
