//! Health check endpoint

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Connectivity of one persistence context
#[derive(Debug, Serialize)]
pub struct ContextHealth {
    pub engine: &'static str,
    pub ok: bool,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub contexts: BTreeMap<String, ContextHealth>,
}

/// GET /health - 503 when any context cannot be reached
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut contexts = BTreeMap::new();
    for context in [state.todos(), state.blog()] {
        let ok = match context.verify().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(context = context.name(), error = %e, "health check failed");
                false
            }
        };
        contexts.insert(
            context.name().to_owned(),
            ContextHealth {
                engine: context.db().kind(),
                ok,
            },
        );
    }

    let healthy = contexts.values().all(|c| c.ok);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            contexts,
        }),
    )
}

/// Health routes
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
