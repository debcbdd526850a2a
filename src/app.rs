use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers;
use crate::middleware::{
    csrf_protect, expose_error_detail, rate_limit, require_principal, session_guard, RateLimitScope,
    SYNC_USER_RATE_KEY,
};
use crate::state::AppState;

/// Assemble the full HTTP surface around `state`.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Protected API
        .merge(funnel_routes(&state))
        .merge(user_routes(&state))
        .merge(workflow_routes(&state))
        .fallback(handlers::not_found);

    if !state.config.is_production() {
        router = router.layer(from_fn(expose_error_detail));
    }

    // Global middleware, innermost first
    router = router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.api.max_request_size_bytes))
        .layer(from_fn_with_state(state.clone(), csrf_protect))
        .layer(from_fn_with_state(state.clone(), session_guard));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn funnel_routes(state: &AppState) -> Router<AppState> {
    use handlers::protected::funnels;

    Router::new()
        .route("/api/funnels", get(funnels::funnels_get).post(funnels::funnels_post))
        .route_layer(from_fn_with_state(state.clone(), require_principal))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let scope = RateLimitScope {
        limiter: state.sync_user_limiter.clone(),
        key: SYNC_USER_RATE_KEY,
    };

    // The later route_layer wraps the earlier one: rate limiting runs before auth
    Router::new()
        .route("/api/sync-user", post(handlers::sync_user))
        .route_layer(from_fn_with_state(state.clone(), require_principal))
        .route_layer(from_fn_with_state(scope, rate_limit))
}

fn workflow_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/workspaces/:workspace_id/workflows/templates/:template_id",
            get(handlers::workflow_template_get),
        )
        .route_layer(from_fn_with_state(state.clone(), require_principal))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
