//! Bearer-token authentication against an external identity service.
//!
//! The authenticator never validates tokens itself: it pulls the bearer token
//! out of the `Authorization` header and hands it to an [`IdentityProvider`].

pub mod jwt;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub use jwt::{Claims, JwtError, JwtIdentityProvider};
pub use remote::RemoteIdentityProvider;

/// The identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Why a request could not be authenticated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("missing or malformed authorization header")]
    MissingHeader,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("identity service error: {0}")]
    ServiceError(String),
}

impl AuthFailure {
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::MissingHeader => "MISSING_AUTHORIZATION",
            AuthFailure::InvalidToken(_) => "INVALID_TOKEN",
            AuthFailure::ServiceError(_) => "AUTH_SERVICE_ERROR",
        }
    }
}

/// Capability interface over the hosted identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<Principal, AuthFailure>;
}

#[derive(Clone)]
pub struct Authenticator {
    provider: Arc<dyn IdentityProvider>,
}

impl Authenticator {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a principal from a raw `Authorization` header value.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Principal, AuthFailure> {
        let token = extract_bearer(header)?;
        self.verify(token).await
    }

    /// Verify a bare token (e.g. one read from a session cookie).
    pub async fn verify(&self, token: &str) -> Result<Principal, AuthFailure> {
        match self.provider.verify_token(token).await {
            Ok(principal) => Ok(principal),
            Err(failure) => {
                match &failure {
                    AuthFailure::ServiceError(msg) => {
                        tracing::error!(token = %token_fingerprint(token), "Identity service error: {}", msg)
                    }
                    other => tracing::debug!(token = %token_fingerprint(token), "Token rejected: {}", other),
                }
                Err(failure)
            }
        }
    }
}

/// Extract the token from `Bearer <token>`. Anything else counts as a missing header.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthFailure> {
    let value = header.ok_or(AuthFailure::MissingHeader)?;
    let token = value.strip_prefix("Bearer ").ok_or(AuthFailure::MissingHeader)?.trim();
    if token.is_empty() {
        return Err(AuthFailure::MissingHeader);
    }
    Ok(token)
}

/// Short SHA-256 prefix of a token, safe to put in logs.
pub fn token_fingerprint(token: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(token.as_bytes()));
    digest[..12].to_string()
}
