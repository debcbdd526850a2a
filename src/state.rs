use std::sync::Arc;

use crate::auth::{Authenticator, IdentityProvider, JwtIdentityProvider, RemoteIdentityProvider};
use crate::config::{AppConfig, VerifierKind};
use crate::database::{DataStore, DatabaseError, DatabaseManager, MemoryDataStore, PgDataStore};
use crate::middleware::{CookieSessionProvider, RateLimiter, SessionProvider};
use crate::services::{registry, PermissionChecker, TemplateRegistry};

/// Shared, read-mostly handles every request needs.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub authenticator: Authenticator,
    pub store: Arc<dyn DataStore>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub sessions: Arc<dyn SessionProvider>,
    pub templates: &'static TemplateRegistry,
    pub sync_user_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wire state from explicit collaborators. `store` also answers permission lookups.
    pub fn new<S>(config: AppConfig, identity: Arc<dyn IdentityProvider>, store: Arc<S>) -> Self
    where
        S: DataStore + PermissionChecker + 'static,
    {
        let authenticator = Authenticator::new(identity);
        let sessions = Arc::new(CookieSessionProvider::new(
            authenticator.clone(),
            config.session.cookie_name.clone(),
        ));
        let sync_user_limiter = Arc::new(RateLimiter::from_config(&config.api));

        Self {
            config: Arc::new(config),
            authenticator,
            store: store.clone(),
            permissions: store,
            sessions,
            templates: registry(),
            sync_user_limiter,
        }
    }

    /// Build production collaborators from configuration: Postgres when a
    /// database URL is set, otherwise the in-memory store (development only).
    pub async fn from_config(config: AppConfig) -> Result<Self, DatabaseError> {
        let identity = identity_from_config(&config);

        match config.database.url {
            Some(_) => {
                let pool = DatabaseManager::connect(&config.database).await?;
                if config.database.run_migrations {
                    DatabaseManager::migrate(&pool).await?;
                }
                Ok(Self::new(config, identity, Arc::new(PgDataStore::new(pool))))
            }
            None if config.is_production() => Err(DatabaseError::ConfigMissing("DATABASE_URL")),
            None => {
                tracing::warn!("DATABASE_URL not set; using the in-memory store (data is lost on restart)");
                Ok(Self::new(config, identity, Arc::new(MemoryDataStore::new())))
            }
        }
    }
}

pub fn identity_from_config(config: &AppConfig) -> Arc<dyn IdentityProvider> {
    match config.identity.verifier {
        VerifierKind::Remote => Arc::new(RemoteIdentityProvider::new(
            &config.identity.backend_url,
            config.identity.anon_key.clone(),
        )),
        VerifierKind::Jwt => Arc::new(JwtIdentityProvider::new(config.identity.jwt_secret.clone())),
    }
}
