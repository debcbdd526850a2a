pub mod auth;
pub mod cookies;
pub mod csrf;
pub mod rate_limit;
pub mod response;
pub mod session_guard;

pub use auth::require_principal;
pub use csrf::csrf_protect;
pub use rate_limit::{rate_limit, RateDecision, RateLimitScope, RateLimiter, SYNC_USER_RATE_KEY};
pub use response::{expose_error_detail, ApiResponse, ApiResult};
pub use session_guard::{session_guard, CookieSessionProvider, SessionProvider};
