use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer authentication middleware.
///
/// Resolves the `Principal` through the configured identity provider and
/// injects it into request extensions. On failure the request never reaches
/// a handler, so nothing downstream touches the store.
pub async fn require_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Owned copies: the request body is not Sync, so no borrows across the await
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let path = request.uri().path().to_owned();

    let principal = state
        .authenticator
        .authenticate(header_value.as_deref())
        .await
        .map_err(|failure| {
            tracing::warn!(path = %path, code = failure.code(), "Authentication failed");
            ApiError::from(failure)
        })?;

    tracing::debug!(user = %principal.id, "Authenticated request");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
