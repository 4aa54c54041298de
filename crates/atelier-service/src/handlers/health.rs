//! Liveness probe.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use atelier_core::UserId;
use atelier_store::Store;

use crate::state::AppState;

/// Probe body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    /// Always `atelier`.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Whether top-ups can be started.
    pub payments: bool,
    /// Whether the generation proxy is available.
    pub generation: bool,
}

/// Reports 503 when the store cannot serve a read.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    // Any valid id works; only the read path matters.
    let store_ok = UserId::new("health-probe")
        .map(|probe| state.store.get_account(&probe).is_ok())
        .unwrap_or(false);

    if !store_ok {
        tracing::error!("Health probe could not read from the store");
    }

    let status = if store_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(HealthResponse {
            status: if store_ok { "ok" } else { "degraded" },
            service: "atelier",
            version: env!("CARGO_PKG_VERSION"),
            payments: state.gateway.is_some(),
            generation: state.generative.is_some(),
        }),
    )
}
