//! Catalog Listing Endpoint
//!
//! GET /api/datasources?startDateIndex=N returns the canned page of data
//! sources as a JSON array of `{displayName, fields}` records.

use axum::{extract::Query, routing::get, Json, Router};
use serde::Deserialize;
use sourcedeck_core::DataSource;

use crate::catalog;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesQuery {
    #[serde(default)]
    pub start_date_index: i64,
}

/// GET /api/datasources - canned source page
pub async fn list_sources(Query(params): Query<SourcesQuery>) -> Json<Vec<DataSource>> {
    Json(catalog::sample_sources(params.start_date_index))
}

pub fn create_router() -> Router {
    Router::new().route("/datasources", get(list_sources))
}
