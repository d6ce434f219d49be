use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// API routes under `/api`, static front-end everywhere else
pub fn app(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(state))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
}

/// Serve until Ctrl-C, then tear the feed down
pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = app(state.clone(), &config.static_dir);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", config.port);

    let handle = state.feed.lock().await.handle();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", err);
            }
            // unblocks a refresh holding the feed lock
            handle.shutdown();
        })
        .await
        .with_context(|| "Web server failed")?;

    state.feed.lock().await.shutdown()?;
    tracing::info!("Feed shut down");
    Ok(())
}
