//! Canned sample catalog.
//!
//! The demo server always answers from this fixed data set; the page index
//! is accepted and logged but does not change the canned page.

use sourcedeck_core::{DataSource, QueryRequest, QueryResult};

pub const SOURCE_NAMES: [&str; 3] = ["Partner", "Sales", "Nonsense"];

pub const FIELD_NAMES: [&str; 4] = ["OneField", "TwoField", "BlueField", "RedField"];

/// The canned page of sources returned for any start index.
pub fn sample_sources(start_index: i64) -> Vec<DataSource> {
    tracing::debug!(start_index, "serving canned source page");
    SOURCE_NAMES
        .iter()
        .map(|name| {
            DataSource::new(
                *name,
                FIELD_NAMES.iter().map(|field| field.to_string()).collect(),
            )
        })
        .collect()
}

/// Deterministic dummy payload for a filtered query: one row per requested
/// source/field pair, echoing the requested range.
pub fn sample_query_result(request: &QueryRequest) -> QueryResult {
    let rows: Vec<QueryResult> = request
        .sources
        .iter()
        .flat_map(|selector| {
            selector.fields.iter().map(move |field| {
                serde_json::json!({
                    "source": selector.name,
                    "field": field,
                    "value": field.len() as i64 * 10,
                })
            })
        })
        .collect();

    serde_json::json!({
        "queryRange": request.query_range,
        "stores": request.stores,
        "rows": rows,
    })
}
