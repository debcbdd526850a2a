use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Backend URL shipped in sample `.env` files. Seeing it at runtime means the
/// identity backend was never configured.
pub const PLACEHOLDER_BACKEND_URL: &str = "https://placeholder.supabase.co";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub identity: IdentityConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Absent means "use the in-memory store" (development only).
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enforce_csrf: bool,
    pub csrf_cookie_name: String,
    pub csrf_header_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifierKind {
    /// Ask the hosted auth service who owns the token.
    Remote,
    /// Verify tokens locally against the backend's shared JWT secret.
    Jwt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub backend_url: String,
    pub anon_key: String,
    pub jwt_secret: String,
    pub verifier: VerifierKind,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub protected_prefixes: Vec<String>,
    pub auth_prefixes: Vec<String>,
    pub login_path: String,
    pub home_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Some(v) = env::var("FUNNEL_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs = v.parse().unwrap_or(self.api.rate_limit_window_secs);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_ENFORCE_CSRF") {
            self.security.enforce_csrf = v.parse().unwrap_or(self.security.enforce_csrf);
        }
        if let Ok(v) = env::var("SECURITY_CSRF_COOKIE") {
            self.security.csrf_cookie_name = v;
        }
        if let Ok(v) = env::var("SECURITY_CSRF_HEADER") {
            self.security.csrf_header_name = v.to_ascii_lowercase();
        }

        // Identity overrides
        if let Ok(v) = env::var("AUTH_BACKEND_URL") {
            self.identity.backend_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("AUTH_ANON_KEY") {
            self.identity.anon_key = v;
        }
        if let Ok(v) = env::var("AUTH_JWT_SECRET") {
            self.identity.jwt_secret = v;
        }
        match env::var("AUTH_VERIFIER").as_deref() {
            Ok("jwt") => self.identity.verifier = VerifierKind::Jwt,
            Ok("remote") => self.identity.verifier = VerifierKind::Remote,
            _ => {}
        }
        if let Ok(v) = env::var("AUTH_JWT_EXPIRY_HOURS") {
            self.identity.jwt_expiry_hours = v.parse().unwrap_or(self.identity.jwt_expiry_hours);
        }

        // Session guard overrides
        if let Ok(v) = env::var("SESSION_COOKIE") {
            self.session.cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_PROTECTED_PREFIXES") {
            self.session.protected_prefixes = split_list(&v);
        }
        if let Ok(v) = env::var("SESSION_AUTH_PREFIXES") {
            self.session.auth_prefixes = split_list(&v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_rate_limiting: false,
                rate_limit_requests: 1000,
                rate_limit_window_secs: 60,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                enforce_csrf: true,
                csrf_cookie_name: "csrf_token".to_string(),
                csrf_header_name: "x-csrf-token".to_string(),
            },
            identity: IdentityConfig {
                backend_url: PLACEHOLDER_BACKEND_URL.to_string(),
                anon_key: String::new(),
                jwt_secret: String::new(),
                verifier: VerifierKind::Remote,
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            session: SessionConfig::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_rate_limiting: true,
                rate_limit_requests: 100,
                rate_limit_window_secs: 60,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                ..Self::development().security
            },
            identity: IdentityConfig {
                jwt_expiry_hours: 24,
                ..Self::development().identity
            },
            session: SessionConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                port: 3000,
                enable_rate_limiting: true,
                rate_limit_requests: 10,
                rate_limit_window_secs: 60,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                ..Self::development().security
            },
            identity: IdentityConfig {
                jwt_expiry_hours: 4,
                ..Self::development().identity
            },
            session: SessionConfig::default(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// True when the identity backend still points at the sample placeholder.
    pub fn uses_placeholder_backend(&self) -> bool {
        self.identity.backend_url.trim_end_matches('/') == PLACEHOLDER_BACKEND_URL
    }

    /// Session guard enforcement: production only, and never against a placeholder backend.
    pub fn session_guard_enforced(&self) -> bool {
        self.is_production() && !self.uses_placeholder_backend()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sb-access-token".to_string(),
            protected_prefixes: vec!["/dashboard".to_string(), "/funnels".to_string(), "/builder".to_string()],
            auth_prefixes: vec!["/login".to_string(), "/signup".to_string()],
            login_path: "/login".to_string(),
            home_path: "/dashboard".to_string(),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
