use funnel_builder_api::{build_router, config, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Funnel Builder API in {:?} mode", config.environment);

    if !config.session_guard_enforced() {
        tracing::warn!(
            backend = %config.identity.backend_url,
            "Session guard disabled: not running in production or identity backend is a placeholder"
        );
    }

    let state = AppState::from_config(config.clone()).await?;
    tracing::info!(backend = state.store.backend_name(), "Data store ready");

    let app = build_router(state);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Funnel Builder API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
