//! The request coordinator.
//!
//! Owns the single [`RequestState`], decides whether a call needs a fetch,
//! spawns fetches onto the runtime, and applies their completions strictly
//! in arrival order. Completions travel back over an in-process channel, so
//! every transition is applied by the coordinator's owner; no transition
//! observes a partially-applied update from another.

use crate::action::{Action, RequestKey, SUBMIT_KEY};
use crate::error::FetchError;
use crate::state::{reduce, RequestState};
use crate::types::{DataSource, QueryRange, QueryRequest, QueryResult, SourceSelector};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;

/// Snapshots retained for inspection of past transitions.
const HISTORY_LIMIT: usize = 64;

/// Buffered outbound events per subscriber.
const EVENT_CAPACITY: usize = 256;

/// The remote catalog, seen as a pair of black-box asynchronous functions.
#[async_trait]
pub trait SourceFetcher: Send + Sync + 'static {
    /// Fetch the page of sources at `start_index`.
    async fn fetch_sources(&self, start_index: RequestKey)
        -> Result<Vec<DataSource>, FetchError>;

    /// Submit a filtered query and return its opaque payload.
    async fn submit_query(&self, request: QueryRequest) -> Result<QueryResult, FetchError>;
}

/// Parameters every filtered query is built with.
#[derive(Debug, Clone)]
pub struct QueryDefaults {
    pub range: QueryRange,
    pub stores: Vec<String>,
}

/// Versioned request/response state machine over a [`SourceFetcher`].
pub struct RequestCoordinator {
    state: RequestState,
    history: VecDeque<RequestState>,
    fetcher: Arc<dyn SourceFetcher>,
    query: QueryDefaults,
    completions_tx: mpsc::UnboundedSender<Action>,
    completions_rx: mpsc::UnboundedReceiver<Action>,
    events_tx: broadcast::Sender<Action>,
    pending: JoinSet<()>,
}

impl RequestCoordinator {
    pub fn new(fetcher: Arc<dyn SourceFetcher>, query: QueryDefaults) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RequestState::unloaded(),
            history: VecDeque::new(),
            fetcher,
            query,
            completions_tx,
            completions_rx,
            events_tx,
            pending: JoinSet::new(),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Previous snapshots, oldest first.
    pub fn history(&self) -> &VecDeque<RequestState> {
        &self.history
    }

    /// Subscribe to the ordered stream of dispatched actions.
    pub fn subscribe(&self) -> broadcast::Receiver<Action> {
        self.events_tx.subscribe()
    }

    /// Number of fetches issued but not yet joined.
    pub fn pending_fetches(&self) -> usize {
        self.pending.len()
    }

    /// Request the collection for `request_key`, optionally scoped by a
    /// filter selector.
    ///
    /// A non-empty filter together with the submit sentinel routes to the
    /// filtered-submit path; anything else (including an empty filter) is a
    /// paginated fetch.
    pub fn request_collection(&mut self, request_key: RequestKey, filter: Option<&str>) {
        match filter {
            Some(selector) if !selector.is_empty() && request_key == SUBMIT_KEY => {
                self.submit_filtered(selector)
            }
            _ => self.fetch_page(request_key),
        }
    }

    fn fetch_page(&mut self, request_key: RequestKey) {
        // Only load data we don't already have and aren't already loading.
        // A recorded failure re-admits its key so the caller can retry.
        if self.state.request_key == Some(request_key) && self.state.last_error.is_none() {
            tracing::debug!(request_key, "page already loaded or in flight");
            return;
        }

        self.dispatch(Action::RequestStarted { request_key });

        let fetcher = Arc::clone(&self.fetcher);
        let completions = self.completions_tx.clone();
        self.pending.spawn(async move {
            let action = match fetcher.fetch_sources(request_key).await {
                Ok(sources) => Action::RequestCompleted {
                    request_key,
                    sources,
                },
                Err(err) => Action::RequestFailed {
                    request_key,
                    error: err.to_string(),
                },
            };
            let _ = completions.send(action);
        });
    }

    // Every submit fetches; there is no idempotence guard on this path.
    fn submit_filtered(&mut self, selector: &str) {
        let fields = self
            .state
            .sources
            .iter()
            .find(|source| source.display_name == selector)
            .map(|source| source.fields.clone())
            .unwrap_or_default();
        let request = QueryRequest {
            query_range: self.query.range.clone(),
            sources: vec![SourceSelector {
                name: selector.to_string(),
                fields,
            }],
            stores: self.query.stores.clone(),
        };

        self.dispatch(Action::RequestStarted {
            request_key: SUBMIT_KEY,
        });

        let fetcher = Arc::clone(&self.fetcher);
        let completions = self.completions_tx.clone();
        let for_source = selector.to_string();
        self.pending.spawn(async move {
            let action = match fetcher.submit_query(request).await {
                Ok(result) => Action::QueryCompleted { for_source, result },
                Err(err) => Action::RequestFailed {
                    request_key: SUBMIT_KEY,
                    error: err.to_string(),
                },
            };
            let _ = completions.send(action);
        });
    }

    /// Apply an action: reduce to the next snapshot, retire the previous one
    /// into history, and publish the action to subscribers.
    pub fn dispatch(&mut self, action: Action) {
        tracing::debug!(?action, "dispatch");
        let next = reduce(&self.state, &action);
        let previous = std::mem::replace(&mut self.state, next);
        self.history.push_back(previous);
        if self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
        let _ = self.events_tx.send(action);
    }

    /// Apply every completion that has already arrived, in order. Returns
    /// the number applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.completions_rx.try_recv() {
            self.dispatch(action);
            applied += 1;
        }
        applied
    }

    /// Barrier: await every pending fetch, then apply their completions.
    ///
    /// After this returns the machine is settled; callers synchronizing on
    /// quiescence (prerender, tests) can read a stable state.
    pub async fn quiesce(&mut self) {
        while self.pending.join_next().await.is_some() {}
        self.pump();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::REFRESH_KEY;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn defaults() -> QueryDefaults {
        QueryDefaults {
            range: QueryRange { start: 0, end: 3600 },
            stores: vec!["primary".to_string()],
        }
    }

    fn partner() -> DataSource {
        DataSource::new("Partner", vec!["OneField".to_string()])
    }

    fn sales() -> DataSource {
        DataSource::new(
            "Sales",
            vec!["OneField".to_string(), "TwoField".to_string()],
        )
    }

    /// Resolves immediately from a canned page map; counts calls.
    #[derive(Default)]
    struct CannedFetcher {
        pages: Mutex<HashMap<RequestKey, Vec<DataSource>>>,
        page_calls: Mutex<Vec<RequestKey>>,
        query_calls: Mutex<Vec<QueryRequest>>,
        query_result: QueryResult,
        fail_pages: AtomicBool,
    }

    impl CannedFetcher {
        fn with_pages(pages: Vec<(RequestKey, Vec<DataSource>)>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().collect()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SourceFetcher for CannedFetcher {
        async fn fetch_sources(
            &self,
            start_index: RequestKey,
        ) -> Result<Vec<DataSource>, FetchError> {
            self.page_calls.lock().unwrap().push(start_index);
            if self.fail_pages.load(Ordering::SeqCst) {
                return Err(FetchError::Transport("connection refused".to_string()));
            }
            Ok(self
                .pages
                .lock()
                .unwrap()
                .get(&start_index)
                .cloned()
                .unwrap_or_default())
        }

        async fn submit_query(&self, request: QueryRequest) -> Result<QueryResult, FetchError> {
            self.query_calls.lock().unwrap().push(request);
            Ok(self.query_result.clone())
        }
    }

    /// Holds each page fetch until the test releases its gate, so resolution
    /// order is controlled explicitly.
    struct GatedFetcher {
        gates: Mutex<HashMap<RequestKey, oneshot::Receiver<Vec<DataSource>>>>,
    }

    impl GatedFetcher {
        fn new(keys: &[RequestKey]) -> (Self, HashMap<RequestKey, oneshot::Sender<Vec<DataSource>>>) {
            let mut gates = HashMap::new();
            let mut senders = HashMap::new();
            for &key in keys {
                let (tx, rx) = oneshot::channel();
                gates.insert(key, rx);
                senders.insert(key, tx);
            }
            (
                Self {
                    gates: Mutex::new(gates),
                },
                senders,
            )
        }
    }

    #[async_trait]
    impl SourceFetcher for GatedFetcher {
        async fn fetch_sources(
            &self,
            start_index: RequestKey,
        ) -> Result<Vec<DataSource>, FetchError> {
            let gate = self
                .gates
                .lock()
                .unwrap()
                .remove(&start_index)
                .expect("gate registered for key");
            Ok(gate.await.expect("gate resolved"))
        }

        async fn submit_query(&self, _request: QueryRequest) -> Result<QueryResult, FetchError> {
            Ok(QueryResult::Null)
        }
    }

    /// Wait until at least one completion has arrived and been applied.
    async fn pump_until_applied(coordinator: &mut RequestCoordinator) {
        for _ in 0..100 {
            if coordinator.pump() > 0 {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("no completion arrived");
    }

    fn drain_events(rx: &mut broadcast::Receiver<Action>) -> Vec<Action> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    // ========================================================================
    // Scenarios
    // ========================================================================

    #[tokio::test]
    async fn test_first_fetch_loads_collection() {
        let fetcher = Arc::new(CannedFetcher::with_pages(vec![(0, vec![partner()])]));
        let mut coordinator = RequestCoordinator::new(fetcher, defaults());

        coordinator.request_collection(0, None);
        assert!(coordinator.state().is_loading);
        assert_eq!(coordinator.state().request_key, Some(0));
        assert!(coordinator.state().sources.is_empty());

        coordinator.quiesce().await;
        assert!(!coordinator.state().is_loading);
        assert_eq!(coordinator.state().request_key, Some(0));
        assert_eq!(coordinator.state().sources, vec![partner()]);
    }

    #[tokio::test]
    async fn test_repeat_request_is_suppressed() {
        let fetcher = Arc::new(CannedFetcher::with_pages(vec![(0, vec![partner()])]));
        let dyn_fetcher: Arc<dyn SourceFetcher> = fetcher.clone();
        let mut coordinator = RequestCoordinator::new(dyn_fetcher, defaults());
        let mut events = coordinator.subscribe();

        coordinator.request_collection(0, None);
        coordinator.quiesce().await;
        let loaded = coordinator.state().clone();

        coordinator.request_collection(0, None);
        coordinator.quiesce().await;

        assert_eq!(coordinator.state(), &loaded);
        assert_eq!(fetcher.page_calls.lock().unwrap().len(), 1);
        let started = drain_events(&mut events)
            .into_iter()
            .filter(|event| matches!(event, Action::RequestStarted { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[tokio::test]
    async fn test_duplicate_in_flight_request_is_suppressed() {
        let (fetcher, mut gates) = GatedFetcher::new(&[0]);
        let mut coordinator = RequestCoordinator::new(Arc::new(fetcher), defaults());
        let mut events = coordinator.subscribe();

        coordinator.request_collection(0, None);
        coordinator.request_collection(0, None);

        gates.remove(&0).unwrap().send(vec![partner()]).unwrap();
        coordinator.quiesce().await;

        assert_eq!(coordinator.state().sources, vec![partner()]);
        let started = drain_events(&mut events)
            .into_iter()
            .filter(|event| matches!(event, Action::RequestStarted { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[tokio::test]
    async fn test_out_of_order_resolution_keeps_latest_request() {
        let (fetcher, mut gates) = GatedFetcher::new(&[0, 5]);
        let mut coordinator = RequestCoordinator::new(Arc::new(fetcher), defaults());

        coordinator.request_collection(0, None);
        coordinator.request_collection(5, None);
        assert_eq!(coordinator.state().request_key, Some(5));

        // The most recent request resolves first and is accepted.
        gates.remove(&5).unwrap().send(vec![sales()]).unwrap();
        pump_until_applied(&mut coordinator).await;
        assert!(!coordinator.state().is_loading);
        assert_eq!(coordinator.state().sources, vec![sales()]);

        // The superseded request resolves afterwards and is discarded.
        gates.remove(&0).unwrap().send(vec![partner()]).unwrap();
        coordinator.quiesce().await;
        assert_eq!(coordinator.state().request_key, Some(5));
        assert_eq!(coordinator.state().sources, vec![sales()]);
    }

    #[tokio::test]
    async fn test_stale_completion_leaves_state_unchanged() {
        let fetcher = Arc::new(CannedFetcher::with_pages(vec![(5, vec![partner()])]));
        let mut coordinator = RequestCoordinator::new(fetcher, defaults());

        coordinator.request_collection(5, None);
        coordinator.quiesce().await;
        coordinator.dispatch(Action::RequestStarted { request_key: 6 });
        let before = coordinator.state().clone();

        coordinator.dispatch(Action::RequestCompleted {
            request_key: 5,
            sources: vec![sales()],
        });

        assert_eq!(coordinator.state(), &before);
        assert!(coordinator.state().is_loading);
        assert_eq!(coordinator.state().request_key, Some(6));
        assert_eq!(coordinator.state().sources, vec![partner()]);
    }

    #[tokio::test]
    async fn test_dispatch_retires_unchanged_snapshot() {
        let fetcher = Arc::new(CannedFetcher::default());
        let mut coordinator = RequestCoordinator::new(fetcher, defaults());

        let snapshot = coordinator.state().clone();
        coordinator.dispatch(Action::RequestStarted { request_key: 3 });

        assert_eq!(coordinator.history().back(), Some(&snapshot));
        assert_ne!(coordinator.state(), &snapshot);
    }

    #[tokio::test]
    async fn test_filtered_submit_builds_query_from_matching_source() {
        let fetcher = Arc::new(CannedFetcher {
            pages: Mutex::new(
                [(0, vec![partner(), sales()])].into_iter().collect(),
            ),
            query_result: serde_json::json!({"rows": [1, 2, 3]}),
            ..CannedFetcher::default()
        });
        let dyn_fetcher: Arc<dyn SourceFetcher> = fetcher.clone();
        let mut coordinator = RequestCoordinator::new(dyn_fetcher, defaults());

        coordinator.request_collection(0, None);
        coordinator.quiesce().await;

        coordinator.request_collection(SUBMIT_KEY, Some("Sales"));
        assert!(coordinator.state().is_loading);
        assert_eq!(coordinator.state().request_key, Some(SUBMIT_KEY));

        coordinator.quiesce().await;
        assert!(!coordinator.state().is_loading);
        assert_eq!(coordinator.state().filter.as_deref(), Some("Sales"));
        assert_eq!(
            coordinator.state().query_result,
            Some(serde_json::json!({"rows": [1, 2, 3]}))
        );

        let queries = fetcher.query_calls.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(
            queries[0].sources,
            vec![SourceSelector {
                name: "Sales".to_string(),
                fields: vec!["OneField".to_string(), "TwoField".to_string()],
            }]
        );
        assert_eq!(queries[0].query_range, QueryRange { start: 0, end: 3600 });
        assert_eq!(queries[0].stores, vec!["primary".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_path_has_no_idempotence_guard() {
        let fetcher = Arc::new(CannedFetcher {
            query_result: serde_json::json!({"rows": []}),
            ..CannedFetcher::default()
        });
        let dyn_fetcher: Arc<dyn SourceFetcher> = fetcher.clone();
        let mut coordinator = RequestCoordinator::new(dyn_fetcher, defaults());

        coordinator.request_collection(SUBMIT_KEY, Some("Sales"));
        coordinator.quiesce().await;
        coordinator.request_collection(SUBMIT_KEY, Some("Sales"));
        coordinator.quiesce().await;

        assert_eq!(fetcher.query_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_filter_falls_back_to_page_fetch() {
        let fetcher = Arc::new(CannedFetcher::default());
        let dyn_fetcher: Arc<dyn SourceFetcher> = fetcher.clone();
        let mut coordinator = RequestCoordinator::new(dyn_fetcher, defaults());

        coordinator.request_collection(SUBMIT_KEY, Some(""));
        coordinator.quiesce().await;

        assert_eq!(*fetcher.page_calls.lock().unwrap(), vec![SUBMIT_KEY]);
        assert!(fetcher.query_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_fetches_and_records_sentinel() {
        let fetcher = Arc::new(CannedFetcher::with_pages(vec![
            (0, vec![partner()]),
            (REFRESH_KEY, vec![sales()]),
        ]));
        let dyn_fetcher: Arc<dyn SourceFetcher> = fetcher.clone();
        let mut coordinator = RequestCoordinator::new(dyn_fetcher, defaults());

        coordinator.request_collection(0, None);
        coordinator.quiesce().await;
        coordinator.request_collection(REFRESH_KEY, None);
        coordinator.quiesce().await;

        assert_eq!(coordinator.state().request_key, Some(REFRESH_KEY));
        assert_eq!(coordinator.state().sources, vec![sales()]);
    }

    #[tokio::test]
    async fn test_failure_records_error_and_admits_retry() {
        let fetcher = Arc::new(CannedFetcher::with_pages(vec![(0, vec![partner()])]));
        fetcher.fail_pages.store(true, Ordering::SeqCst);
        let dyn_fetcher: Arc<dyn SourceFetcher> = fetcher.clone();
        let mut coordinator = RequestCoordinator::new(dyn_fetcher, defaults());

        coordinator.request_collection(0, None);
        coordinator.quiesce().await;
        assert!(!coordinator.state().is_loading);
        assert_eq!(
            coordinator.state().last_error.as_deref(),
            Some("transport error: connection refused")
        );

        fetcher.fail_pages.store(false, Ordering::SeqCst);
        coordinator.request_collection(0, None);
        coordinator.quiesce().await;

        assert!(coordinator.state().last_error.is_none());
        assert_eq!(coordinator.state().sources, vec![partner()]);
        assert_eq!(fetcher.page_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_quiesce_on_idle_coordinator_returns() {
        let fetcher = Arc::new(CannedFetcher::default());
        let mut coordinator = RequestCoordinator::new(fetcher, defaults());
        coordinator.quiesce().await;
        assert_eq!(coordinator.pending_fetches(), 0);
    }

    #[tokio::test]
    async fn test_event_stream_orders_started_before_completed() {
        let fetcher = Arc::new(CannedFetcher::with_pages(vec![(0, vec![partner()])]));
        let mut coordinator = RequestCoordinator::new(fetcher, defaults());
        let mut events = coordinator.subscribe();

        coordinator.request_collection(0, None);
        coordinator.quiesce().await;

        let events = drain_events(&mut events);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Action::RequestStarted { request_key: 0 }));
        assert!(matches!(
            events[1],
            Action::RequestCompleted { request_key: 0, .. }
        ));
    }
}
