//! Fixed-window rate limiting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Key under which all sync-user calls share one budget.
pub const SYNC_USER_RATE_KEY: &str = "sync-user";

struct Window {
    started: Instant,
    used: u32,
}

/// Outcome of one rate-limit check, reflecting the limiter's real state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window resets.
    pub reset_after: u64,
}

impl RateDecision {
    fn write_headers(&self, headers: &mut HeaderMap) {
        headers.insert("x-ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(self.remaining));
        headers.insert("x-ratelimit-reset", HeaderValue::from(self.reset_after));
    }
}

pub struct RateLimiter {
    enabled: bool,
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(enabled: bool, limit: u32, window: Duration) -> Self {
        Self {
            enabled,
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        Self::new(
            api.enable_rate_limiting,
            api.rate_limit_requests,
            Duration::from_secs(api.rate_limit_window_secs),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut windows = self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let window = windows.entry(key.to_string()).or_insert(Window { started: now, used: 0 });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.used = 0;
        }

        let allowed = window.used < self.limit;
        if allowed {
            window.used += 1;
        }

        let elapsed = now.duration_since(window.started);
        let reset_after = self.window.saturating_sub(elapsed).as_secs_f64().ceil() as u64;

        RateDecision {
            allowed,
            limit: self.limit,
            remaining: self.limit - window.used,
            reset_after,
        }
    }
}

/// Limiter plus the key a route group is charged against.
#[derive(Clone)]
pub struct RateLimitScope {
    pub limiter: Arc<RateLimiter>,
    pub key: &'static str,
}

/// Rejects with 429 once the scope's window is spent; otherwise runs the
/// request and reports the remaining budget in `X-RateLimit-*` headers.
pub async fn rate_limit(State(scope): State<RateLimitScope>, request: Request, next: Next) -> Response {
    if !scope.limiter.is_enabled() {
        return next.run(request).await;
    }

    let decision = scope.limiter.check(scope.key);

    if !decision.allowed {
        tracing::warn!(key = scope.key, "Rate limit exceeded");
        let mut response = ApiError::too_many_requests("Too many requests, please try again later").into_response();
        decision.write_headers(response.headers_mut());
        response
            .headers_mut()
            .insert(axum::http::header::RETRY_AFTER, HeaderValue::from(decision.reset_after));
        return response;
    }

    let mut response = next.run(request).await;
    decision.write_headers(response.headers_mut());
    response
}
