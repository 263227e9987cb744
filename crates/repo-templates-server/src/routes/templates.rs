//! Repository template listing routes

use crate::{
    AppState,
    error::{ApiError, Result},
    models::PageQuery,
};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use repo_templates::{CollectionEnvelope, assemble, assemble_page};
use tracing::debug;

/// Create template routes
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_templates))
}

/// List the templates of all repositories
async fn list_templates(
    State(state): State<AppState>,
    query: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<CollectionEnvelope>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(&e.body_text()))?;
    let page = query.page_request()?;
    debug!("Listing repository templates with query: {:?}", query);

    let templates = state.collector.collect().await;

    let envelope = match page {
        Some(request) => assemble_page(&templates, &state.config.base_url, request),
        None => assemble(&templates, &state.config.base_url),
    };

    Ok(Json(envelope))
}
