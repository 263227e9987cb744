//! Repository Templates HTTP API Server
//!
//! Serves the templates found in the host's repositories as a HAL collection
//! at `/api/v2/repos/templates`.

use axum::{BoxError, Router, error_handling::HandleErrorLayer, response::Json, routing::get};
use repo_templates::{TemplateCollector, assembler::TEMPLATES_PATH};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tower::{ServiceBuilder, timeout::TimeoutLayer, timeout::error::Elapsed};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

pub mod config;
pub mod error;
pub mod models;
pub mod routes;

use config::ServerConfig;
use error::{ApiError, Result};

/// Main application state
#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<TemplateCollector>,
    pub config: ServerConfig,
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // API routes
        .nest("/api", api_routes())
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

/// API routes
fn api_routes() -> Router<AppState> {
    Router::new().nest(
        &format!("/{}", TEMPLATES_PATH),
        routes::templates::router(),
    )
}

/// Map failures of the timeout layer onto the JSON error shape
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        warn!("Request timed out");
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

/// Health check endpoint
async fn health_check() -> Result<Json<Value>> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "repo-templates-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": time::OffsetDateTime::now_utc()
    })))
}
