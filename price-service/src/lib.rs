pub mod cache;
pub mod clock;
pub mod config;
pub mod extractor;
pub mod handlers;
pub mod listing;
pub mod openapi;
pub mod outcome;
pub mod service;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/airbnb-price", get(handlers::get_price))
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
