//! HTTP client for the funnel API, used by the `funnel` CLI and integration tests.

pub mod csrf;

pub use csrf::{CsrfClient, CsrfSettings};

use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} ({code}, HTTP {status})")]
    Api { status: StatusCode, code: String, message: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Filters for `GET /api/funnels`.
#[derive(Debug, Clone, Default)]
pub struct ListFunnelsParams {
    pub published: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Typed operations over a [`CsrfClient`]. Each returns the `data` member of
/// the success envelope.
pub struct ApiClient {
    inner: CsrfClient,
}

impl ApiClient {
    pub fn new(inner: CsrfClient) -> Self {
        Self { inner }
    }

    pub fn csrf(&self) -> &CsrfClient {
        &self.inner
    }

    pub async fn list_funnels(&self, params: &ListFunnelsParams) -> Result<Value, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(published) = params.published {
            query.push(("published", published.to_string()));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = params.offset {
            query.push(("offset", offset.to_string()));
        }

        let builder = self.inner.request(Method::GET, "/api/funnels")?.query(&query);
        unwrap_envelope(builder.send().await?).await
    }

    /// Creates a funnel. Fetches a CSRF token first if the jar has none.
    pub async fn create_funnel(&self, name: &str, template: Option<&str>) -> Result<Value, ClientError> {
        self.ensure_csrf().await?;

        let mut body = json!({ "name": name });
        if let Some(template) = template {
            body["template"] = json!(template);
        }
        let builder = self.inner.request(Method::POST, "/api/funnels")?.json(&body);
        unwrap_envelope(builder.send().await?).await
    }

    pub async fn sync_user(&self) -> Result<Value, ClientError> {
        self.ensure_csrf().await?;
        let builder = self.inner.request(Method::POST, "/api/sync-user")?;
        unwrap_envelope(builder.send().await?).await
    }

    pub async fn workflow_template(&self, workspace_id: &str, template_id: &str) -> Result<Value, ClientError> {
        let path = format!(
            "/api/workspaces/{}/workflows/templates/{}",
            encode_segment(workspace_id),
            encode_segment(template_id)
        );
        let builder = self.inner.request(Method::GET, &path)?;
        unwrap_envelope(builder.send().await?).await
    }

    async fn ensure_csrf(&self) -> Result<(), ClientError> {
        if self.inner.csrf_token().is_none() {
            self.inner.refresh().await?;
        }
        Ok(())
    }
}

fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Split a response into envelope `data` or a typed API error.
async fn unwrap_envelope(response: reqwest::Response) -> Result<Value, ClientError> {
    let status = response.status();
    let body: Value = response.json().await?;

    if status.is_success() {
        return body
            .get("data")
            .cloned()
            .ok_or_else(|| ClientError::InvalidResponse("missing 'data' in success envelope".to_string()));
    }

    Err(ClientError::Api {
        status,
        code: body["code"].as_str().unwrap_or("UNKNOWN").to_string(),
        message: body["message"].as_str().unwrap_or("request failed").to_string(),
    })
}
