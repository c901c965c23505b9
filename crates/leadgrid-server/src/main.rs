use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use leadgrid_core::ScraperConfig;
use leadgrid_server::routes;
use leadgrid_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadgrid=info".parse()?))
        .with_target(false)
        .init();

    let config = ScraperConfig::from_env()?;
    tracing::info!(
        grid_search = config.grid_search,
        grid_points = config.grid_points,
        fallback_scraping = config.fallback_scraping,
        max_sessions = config.max_concurrent_sessions,
        max_results = config.max_results,
        proxies = config.proxies.len(),
        "Configuration loaded"
    );

    let state = Arc::new(AppState::from_config(&config)?);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
