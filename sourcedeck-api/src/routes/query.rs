//! Filtered Query Endpoint
//!
//! POST /api/query accepts a `QueryRequest` and returns an opaque JSON
//! payload built from the canned catalog.

use axum::{routing::post, Json, Router};
use sourcedeck_core::{QueryRequest, QueryResult};

use crate::catalog;
use crate::error::{ApiError, ApiResult};

/// POST /api/query - dummy filtered query
pub async fn submit_query(Json(request): Json<QueryRequest>) -> ApiResult<Json<QueryResult>> {
    if request.sources.is_empty() {
        return Err(ApiError::invalid_input(
            "query must name at least one source",
        ));
    }
    if request.query_range.end < request.query_range.start {
        return Err(ApiError::invalid_input(
            "query range end must not precede start",
        ));
    }

    tracing::debug!(
        sources = request.sources.len(),
        stores = request.stores.len(),
        "serving canned query result"
    );
    Ok(Json(catalog::sample_query_result(&request)))
}

pub fn create_router() -> Router {
    Router::new().route("/query", post(submit_query))
}
