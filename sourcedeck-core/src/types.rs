//! Wire data types shared by the coordinator, the client, and the demo server.
//!
//! Pure data structures with no behavior. Field names are camelCase on the
//! wire.

use serde::{Deserialize, Serialize};

/// A named data source and the fields it exposes.
///
/// `display_name` is unique within one result set and serves as the stable
/// identity key for rendering and drill-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub display_name: String,
    pub fields: Vec<String>,
}

impl DataSource {
    pub fn new(display_name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            display_name: display_name.into(),
            fields,
        }
    }
}

/// Inclusive time window applied to a filtered query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRange {
    pub start: i64,
    pub end: i64,
}

/// One source entry of a filtered query: the source name plus the fields to
/// pull from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSelector {
    pub name: String,
    pub fields: Vec<String>,
}

/// Body of the filtered query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query_range: QueryRange,
    pub sources: Vec<SourceSelector>,
    pub stores: Vec<String>,
}

/// The filtered query endpoint returns an opaque payload; the coordinator
/// records it without interpreting it.
pub type QueryResult = serde_json::Value;
