//! Store actions.
//!
//! Actions are serializable descriptions of state transitions; they carry no
//! side effects themselves. The closed union plus Rust's exhaustive match in
//! `reduce` guarantees that adding a new action kind without handling it is a
//! build-time error.

use crate::types::{DataSource, QueryResult};
use serde::{Deserialize, Serialize};

/// Page index of a collection request. Negative values are reserved
/// sentinels, not absent-value markers.
pub type RequestKey = i64;

/// Sentinel key: force a refresh of the current collection. Completions
/// carrying this key are always accepted by the reducer.
pub const REFRESH_KEY: RequestKey = -1;

/// Sentinel key: submit a filtered query instead of a page fetch.
pub const SUBMIT_KEY: RequestKey = -2;

/// Every event the coordinator can dispatch, tagged for the outbound event
/// stream as `{"type": "REQUEST_STARTED", ...}` and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// A fetch was issued for the given key.
    #[serde(rename_all = "camelCase")]
    RequestStarted { request_key: RequestKey },

    /// A page fetch resolved with a result set.
    #[serde(rename_all = "camelCase")]
    RequestCompleted {
        request_key: RequestKey,
        sources: Vec<DataSource>,
    },

    /// A filtered query resolved with an opaque payload.
    #[serde(rename_all = "camelCase")]
    QueryCompleted {
        for_source: String,
        result: QueryResult,
    },

    /// A fetch failed before producing a result.
    #[serde(rename_all = "camelCase")]
    RequestFailed {
        request_key: RequestKey,
        error: String,
    },
}

impl Action {
    /// The request key the action reconciles against, if it carries one.
    pub fn request_key(&self) -> Option<RequestKey> {
        match self {
            Action::RequestStarted { request_key }
            | Action::RequestCompleted { request_key, .. }
            | Action::RequestFailed { request_key, .. } => Some(*request_key),
            Action::QueryCompleted { .. } => None,
        }
    }
}
