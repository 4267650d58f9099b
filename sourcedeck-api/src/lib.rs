//! Sourcedeck API - Demo Data Endpoint
//!
//! A minimal Axum server exposing the canned catalog page and the dummy
//! filtered query endpoint consumed by the sourcedeck client.

pub mod catalog;
pub mod error;
pub mod routes;

pub use error::{ApiError, ApiResult, ErrorCode};

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router.
pub fn create_api_router() -> Router {
    let api = routes::sources::create_router().merge(routes::query::create_router());

    Router::new()
        .nest("/api", api)
        .nest("/health", routes::health::create_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
