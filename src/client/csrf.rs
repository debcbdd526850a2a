//! Cookie-aware HTTP client that mirrors the CSRF cookie into a request header.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header::AUTHORIZATION, Method, RequestBuilder};
use url::Url;

use super::ClientError;
use crate::middleware::cookies::find_cookie;
use crate::middleware::csrf::is_state_changing;

pub const DEFAULT_CSRF_COOKIE: &str = "csrf_token";
pub const DEFAULT_CSRF_HEADER: &str = "x-csrf-token";
pub const DEFAULT_REFRESH_PATH: &str = "/api/funnels?limit=1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfSettings {
    pub cookie_name: String,
    pub header_name: String,
    pub refresh_path: String,
}

impl Default for CsrfSettings {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_CSRF_COOKIE.to_string(),
            header_name: DEFAULT_CSRF_HEADER.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
        }
    }
}

pub struct CsrfClient {
    base_url: Url,
    http: reqwest::Client,
    jar: Arc<Jar>,
    bearer: Option<String>,
    settings: CsrfSettings,
}

impl CsrfClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        // Paths are joined relative to the base, so keep any prefix as a directory
        if !base_url.path().ends_with('/') {
            let prefixed = format!("{}/", base_url.path());
            base_url.set_path(&prefixed);
        }
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder().cookie_provider(jar.clone()).build()?;

        Ok(Self {
            base_url,
            http,
            jar,
            bearer: None,
            settings: CsrfSettings::default(),
        })
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn with_settings(mut self, settings: CsrfSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current token from the cookie jar, if the server has issued one.
    pub fn csrf_token(&self) -> Option<String> {
        let cookies = self.jar.cookies(&self.base_url)?;
        let raw = cookies.to_str().ok()?;
        find_cookie(raw, &self.settings.cookie_name).map(str::to_owned)
    }

    /// Builder for `method path` with the bearer token and, for state-changing
    /// verbs, the mirrored CSRF header. The header is omitted when no cookie exists.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        let mut builder = self.http.request(method.clone(), url);

        if let Some(token) = &self.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if is_state_changing(&method) {
            if let Some(csrf) = self.csrf_token() {
                builder = builder.header(self.settings.header_name.as_str(), csrf);
            }
        }
        Ok(builder)
    }

    /// Issue a GET to the refresh route so the server sets the cookie.
    /// Returns the token now in the jar.
    pub async fn refresh(&self) -> Result<Option<String>, ClientError> {
        let response = self.request(Method::GET, &self.settings.refresh_path)?.send().await?;
        tracing::debug!(status = %response.status(), "CSRF refresh request completed");
        Ok(self.csrf_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_server_names() {
        let settings = CsrfSettings::default();
        assert_eq!(settings.cookie_name, "csrf_token");
        assert_eq!(settings.header_name, "x-csrf-token");
        assert_eq!(settings.refresh_path, "/api/funnels?limit=1");
    }

    #[test]
    fn token_comes_from_the_jar() {
        let client = CsrfClient::new("http://127.0.0.1:9").unwrap();
        assert_eq!(client.csrf_token(), None);

        let url = client.base_url().clone();
        client.jar.add_cookie_str("other=1; Path=/", &url);
        client.jar.add_cookie_str("csrf_token=abc123; Path=/", &url);
        assert_eq!(client.csrf_token().as_deref(), Some("abc123"));
    }

    #[test]
    fn header_mirrored_only_on_mutating_verbs() {
        let client = CsrfClient::new("http://127.0.0.1:9").unwrap().with_bearer("tok");
        let url = client.base_url().clone();
        client.jar.add_cookie_str("csrf_token=abc123; Path=/", &url);

        let post = client.request(Method::POST, "/api/funnels").unwrap().build().unwrap();
        assert_eq!(post.headers().get("x-csrf-token").unwrap(), "abc123");
        assert_eq!(post.headers().get(AUTHORIZATION).unwrap(), "Bearer tok");

        let get = client.request(Method::GET, "/api/funnels").unwrap().build().unwrap();
        assert!(get.headers().get("x-csrf-token").is_none());
    }

    #[test]
    fn paths_keep_the_base_url_prefix() {
        let client = CsrfClient::new("http://gateway.test/api-gw").unwrap();
        assert_eq!(client.base_url().as_str(), "http://gateway.test/api-gw/");

        let post = client.request(Method::POST, "/api/funnels").unwrap().build().unwrap();
        assert_eq!(post.url().as_str(), "http://gateway.test/api-gw/api/funnels");

        let refresh = client.request(Method::GET, DEFAULT_REFRESH_PATH).unwrap().build().unwrap();
        assert_eq!(refresh.url().as_str(), "http://gateway.test/api-gw/api/funnels?limit=1");

        let bare = CsrfClient::new("http://gateway.test").unwrap();
        let get = bare.request(Method::GET, "/health").unwrap().build().unwrap();
        assert_eq!(get.url().as_str(), "http://gateway.test/health");
    }

    #[test]
    fn no_cookie_means_no_header() {
        let client = CsrfClient::new("http://127.0.0.1:9").unwrap();
        let post = client.request(Method::DELETE, "/api/funnels").unwrap().build().unwrap();
        assert!(post.headers().get("x-csrf-token").is_none());
    }
}
