use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use super::{AuthFailure, IdentityProvider, Principal};

/// Asks the hosted auth service to resolve the token (`GET /auth/v1/user`).
pub struct RemoteIdentityProvider {
    client: reqwest::Client,
    user_endpoint: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: Uuid,
    email: Option<String>,
}

impl RemoteIdentityProvider {
    pub fn new(backend_url: &str, anon_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_endpoint: format!("{}/auth/v1/user", backend_url.trim_end_matches('/')),
            anon_key: anon_key.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Principal, AuthFailure> {
        let response = self
            .client
            .get(&self.user_endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthFailure::ServiceError(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let user: RemoteUser = response
                    .json()
                    .await
                    .map_err(|e| AuthFailure::ServiceError(format!("unreadable user payload: {}", e)))?;
                Ok(Principal {
                    id: user.id,
                    email: user.email,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AuthFailure::InvalidToken("rejected by identity service".to_string()))
            }
            other => Err(AuthFailure::ServiceError(format!("unexpected status {}", other))),
        }
    }
}
