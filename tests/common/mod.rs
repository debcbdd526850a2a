#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use funnel_builder_api::auth::{Claims, JwtIdentityProvider, Principal};
use funnel_builder_api::config::{AppConfig, VerifierKind};
use funnel_builder_api::database::MemoryDataStore;
use funnel_builder_api::{build_router, AppState};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Development config that verifies tokens locally with [`TEST_SECRET`].
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.identity.verifier = VerifierKind::Jwt;
    config.identity.jwt_secret = TEST_SECRET.to_string();
    config
}

pub fn mint_token(principal: &Principal) -> String {
    JwtIdentityProvider::new(TEST_SECRET)
        .generate_jwt(&Claims::new(principal, 1))
        .expect("failed to mint test token")
}

pub fn new_principal() -> Principal {
    let id = Uuid::new_v4();
    Principal {
        id,
        email: Some(format!("{}@example.com", id.simple())),
    }
}

/// Router over an in-memory store, driven with `oneshot`.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDataStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryDataStore::new());
        let identity = Arc::new(JwtIdentityProvider::new(config.identity.jwt_secret.clone()));
        let state = AppState::new(config, identity, store.clone());
        Self {
            router: build_router(state),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request(Method::POST, uri, token, Some(body.to_string()))).await
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body)
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid test request")
}

/// Serve the router on an ephemeral local port; returns its base URL.
pub async fn serve(app: &TestApp) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = app.router.clone();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}", addr))
}

/// The real `funnel-builder-api` binary on its own port. Killed on drop.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    /// Spawn the binary and wait until `/health` answers.
    pub async fn start() -> Result<Self> {
        let server = Self::spawn()?;
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_funnel-builder-api"));
        cmd.env("FUNNEL_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            // Empty URL selects the in-memory store
            .env("DATABASE_URL", "")
            .env("AUTH_VERIFIER", "jwt")
            .env("AUTH_JWT_SECRET", TEST_SECRET)
            // Detached pipes so a piped `cargo test` run can see EOF
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
