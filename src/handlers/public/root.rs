use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - service descriptor
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Funnel Builder API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Marketing funnel builder backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "funnels": "/api/funnels (protected - GET list, POST create)",
                "sync_user": "/api/sync-user (protected, rate limited)",
                "templates": "/api/workspaces/:workspace_id/workflows/templates/:template_id (protected, workspace member)",
            },
            "templates": state.templates.ids(),
        }
    }))
}

/// GET /health - liveness plus a store ping
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();
    let backend = state.store.backend_name();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "backend": backend
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(backend, "Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "backend": backend
                    }
                })),
            )
                .into_response()
        }
    }
}

/// Router fallback for unmatched paths.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
