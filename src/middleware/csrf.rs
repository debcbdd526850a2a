//! Double-submit CSRF check for browser requests.
//!
//! Safe requests without the token cookie are handed a fresh one. Unsafe
//! requests that carry the cookie must echo it in the configured header;
//! requests without the cookie (bearer-only API clients) are left alone.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::cookies::request_cookie;
use crate::error::ApiError;
use crate::state::AppState;

/// Verbs whose requests must carry the mirrored token.
pub fn is_state_changing(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}

pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Constant-time check that the echoed header matches the cookie token.
pub fn tokens_match(expected: &str, echoed: Option<&str>) -> bool {
    match echoed {
        // ct_eq is false on length mismatch
        Some(echoed) => bool::from(expected.as_bytes().ct_eq(echoed.as_bytes())),
        None => false,
    }
}

pub async fn csrf_protect(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let security = &state.config.security;
    if !security.enforce_csrf {
        return next.run(request).await;
    }

    let cookie = request_cookie(request.headers(), &security.csrf_cookie_name).map(str::to_owned);

    if is_state_changing(request.method()) {
        if let Some(expected) = cookie.as_deref() {
            let echoed = request
                .headers()
                .get(security.csrf_header_name.as_str())
                .and_then(|v| v.to_str().ok());
            if !tokens_match(expected, echoed) {
                tracing::warn!(path = %request.uri().path(), "CSRF token missing or mismatched");
                return ApiError::forbidden("CSRF token missing or invalid", "CSRF_TOKEN_MISMATCH").into_response();
            }
        }
        return next.run(request).await;
    }

    let mut response = next.run(request).await;
    if cookie.is_none() {
        let set_cookie = format!("{}={}; Path=/; SameSite=Strict", security.csrf_cookie_name, generate_token());
        match HeaderValue::from_str(&set_cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Unable to encode CSRF cookie: {}", e),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mutating_verbs_are_checked() {
        assert!(is_state_changing(&Method::POST));
        assert!(is_state_changing(&Method::DELETE));
        assert!(!is_state_changing(&Method::GET));
        assert!(!is_state_changing(&Method::OPTIONS));
    }

    #[test]
    fn tokens_are_unique_and_header_safe() {
        let (a, b) = (generate_token(), generate_token());
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn echoed_token_must_match_exactly() {
        let token = generate_token();
        assert!(tokens_match(&token, Some(&token)));
        assert!(!tokens_match(&token, None));
        assert!(!tokens_match(&token, Some("")));
        assert!(!tokens_match(&token, Some(&token[..token.len() - 1])));
        assert!(!tokens_match(&token, Some(&format!("{}0", token))));
        assert!(!tokens_match(&token, Some(&generate_token())));
    }
}
