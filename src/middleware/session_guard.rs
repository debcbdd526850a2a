//! Edge guard for UI routes: keeps signed-out users out of the app area and
//! signed-in users out of the login/signup area.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::cookies::request_cookie;
use crate::auth::Authenticator;
use crate::config::SessionConfig;
use crate::state::AppState;

/// Answers "does this request carry a live session?".
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn has_session(&self, headers: &HeaderMap) -> bool;
}

/// Session = access-token cookie the identity provider still accepts.
pub struct CookieSessionProvider {
    authenticator: Authenticator,
    cookie_name: String,
}

impl CookieSessionProvider {
    pub fn new(authenticator: Authenticator, cookie_name: impl Into<String>) -> Self {
        Self {
            authenticator,
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for CookieSessionProvider {
    async fn has_session(&self, headers: &HeaderMap) -> bool {
        match request_cookie(headers, &self.cookie_name) {
            Some(token) => self.authenticator.verify(token).await.is_ok(),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Protected,
    Auth,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(String),
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

pub fn classify(path: &str, session: &SessionConfig) -> PathClass {
    if path.starts_with("/api/") {
        PathClass::Other
    } else if session.protected_prefixes.iter().any(|p| matches_prefix(path, p)) {
        PathClass::Protected
    } else if session.auth_prefixes.iter().any(|p| matches_prefix(path, p)) {
        PathClass::Auth
    } else {
        PathClass::Other
    }
}

/// The guard's transition table, with enforcement already known to be on.
pub fn decide(class: PathClass, has_session: bool, path: &str, session: &SessionConfig) -> GuardDecision {
    match (class, has_session) {
        (PathClass::Protected, false) => {
            let target: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
            GuardDecision::Redirect(format!("{}?redirectTo={}", session.login_path, target))
        }
        (PathClass::Auth, true) => GuardDecision::Redirect(session.home_path.clone()),
        _ => GuardDecision::Pass,
    }
}

pub async fn session_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let class = classify(&path, &state.config.session);
    if class == PathClass::Other {
        return next.run(request).await;
    }

    if !state.config.session_guard_enforced() {
        tracing::debug!(path = %path, "Session guard bypassed (development or placeholder backend)");
        return next.run(request).await;
    }

    let headers = request.headers().clone();
    let has_session = state.sessions.has_session(&headers).await;
    match decide(class, has_session, &path, &state.config.session) {
        GuardDecision::Pass => next.run(request).await,
        GuardDecision::Redirect(to) => {
            tracing::debug!(from = %path, to = %to, "Session guard redirect");
            Redirect::temporary(&to).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_paths_by_prefix_segments() {
        let session = SessionConfig::default();
        assert_eq!(classify("/dashboard", &session), PathClass::Protected);
        assert_eq!(classify("/funnels/abc/edit", &session), PathClass::Protected);
        assert_eq!(classify("/funnelsx", &session), PathClass::Other);
        assert_eq!(classify("/login", &session), PathClass::Auth);
        assert_eq!(classify("/api/funnels", &session), PathClass::Other);
        assert_eq!(classify("/", &session), PathClass::Other);
    }

    #[test]
    fn transition_table() {
        let session = SessionConfig::default();
        assert_eq!(
            decide(PathClass::Protected, false, "/builder/x", &session),
            GuardDecision::Redirect("/login?redirectTo=%2Fbuilder%2Fx".to_string())
        );
        assert_eq!(decide(PathClass::Protected, true, "/dashboard", &session), GuardDecision::Pass);
        assert_eq!(
            decide(PathClass::Auth, true, "/login", &session),
            GuardDecision::Redirect("/dashboard".to_string())
        );
        assert_eq!(decide(PathClass::Auth, false, "/login", &session), GuardDecision::Pass);
        assert_eq!(decide(PathClass::Other, false, "/", &session), GuardDecision::Pass);
    }
}
