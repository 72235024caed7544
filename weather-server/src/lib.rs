//! HTTP surface for the weather resolver.
//!
//! Routes:
//! - `GET /api/weather/:postal_code/:date` resolves weather, wrapped in [`ApiResponse`]
//! - `GET /health` liveness check
//! - anything else: 404 envelope with a path hint

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use weather_core::Resolver;

pub mod api;
pub mod envelope;

pub use envelope::ApiResponse;

/// Application state shared across HTTP handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub resolver: Resolver,
}

impl AppState {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/weather/:postal_code/:date", get(api::get_weather))
        .route("/health", get(api::health_check))
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
