//! HTTP surface
//!
//! Routes, request parsing and response shapes. Handlers stay thin: they
//! validate, normalize uploads, then hand off to the services.

pub mod form;
pub mod stock;
pub mod views;

use crate::app::AppState;
use crate::error::Result;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let settings = state.settings.clone();

    Router::new()
        .route("/health", get(health))
        .route("/api/stock", get(stock::list_stock).post(stock::create_stock))
        .route(
            "/api/stock/:id",
            get(stock::get_stock)
                .post(stock::update_stock)
                .delete(stock::delete_stock),
        )
        .route("/api/stock/:id/qty", patch(stock::update_quantity))
        .nest_service(&settings.public_url, ServeDir::new(settings.storage_dir()))
        .layer(DefaultBodyLimit::max(settings.body_limit()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>> {
    state.repo.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
