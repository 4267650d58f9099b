//! Request state and the pure reducer over it.
//!
//! For a given state and action, `reduce` returns the new state. The old
//! state is never mutated, which preserves snapshot history and replay.

use crate::action::{Action, RequestKey, REFRESH_KEY};
use crate::types::{DataSource, QueryResult};
use serde::{Deserialize, Serialize};

/// The session's view of what was asked for and what was last accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestState {
    /// True between request issuance and its accepted completion.
    pub is_loading: bool,
    /// The most recently requested key; `None` until the first request.
    pub request_key: Option<RequestKey>,
    /// The accepted filtered-query selector.
    pub filter: Option<String>,
    /// The most recently accepted result set.
    pub sources: Vec<DataSource>,
    /// Opaque payload of the most recently accepted filtered query.
    pub query_result: Option<QueryResult>,
    /// Recorded fetch failure; cleared when a new request starts.
    pub last_error: Option<String>,
}

impl RequestState {
    /// The state every session starts from.
    pub fn unloaded() -> Self {
        Self {
            is_loading: false,
            request_key: None,
            filter: None,
            sources: Vec::new(),
            query_result: None,
            last_error: None,
        }
    }
}

impl Default for RequestState {
    fn default() -> Self {
        Self::unloaded()
    }
}

/// Apply an action to a state snapshot, producing the next snapshot.
///
/// Completions are accepted only when they match the most recent request,
/// so out-of-order responses never overwrite newer state. Refresh-sentinel
/// completions are always accepted. Filtered-query completions are accepted
/// when the completed selector differs from the recorded one.
pub fn reduce(state: &RequestState, action: &Action) -> RequestState {
    match action {
        Action::RequestStarted { request_key } => RequestState {
            is_loading: true,
            request_key: Some(*request_key),
            last_error: None,
            filter: state.filter.clone(),
            sources: state.sources.clone(),
            query_result: state.query_result.clone(),
        },
        Action::RequestCompleted {
            request_key,
            sources,
        } => {
            if state.request_key == Some(*request_key) || *request_key == REFRESH_KEY {
                RequestState {
                    is_loading: false,
                    request_key: Some(*request_key),
                    sources: sources.clone(),
                    last_error: None,
                    filter: state.filter.clone(),
                    query_result: state.query_result.clone(),
                }
            } else {
                state.clone()
            }
        }
        Action::QueryCompleted { for_source, result } => {
            if state.filter.as_deref() != Some(for_source.as_str()) {
                RequestState {
                    is_loading: false,
                    filter: Some(for_source.clone()),
                    query_result: Some(result.clone()),
                    last_error: None,
                    request_key: state.request_key,
                    sources: state.sources.clone(),
                }
            } else {
                state.clone()
            }
        }
        Action::RequestFailed { request_key, error } => {
            if state.request_key == Some(*request_key) {
                RequestState {
                    is_loading: false,
                    last_error: Some(error.clone()),
                    ..state.clone()
                }
            } else {
                state.clone()
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
