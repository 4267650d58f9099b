//! Application state and view state definitions.

use crate::config::TuiConfig;
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel};
use sourcedeck_core::{
    Action, RequestCoordinator, SourceFetcher, REFRESH_KEY, SUBMIT_KEY,
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Selection state of the source browser. Sources are identified by display
/// name, the stable identity key of a result set.
#[derive(Debug, Clone, Default)]
pub struct SourceViewState {
    pub selected: Option<String>,
}

pub struct App {
    pub config: TuiConfig,
    pub active_view: View,
    pub coordinator: RequestCoordinator,
    store_events: broadcast::Receiver<Action>,
    /// The start-index route parameter the browser is currently on.
    pub page_index: i64,
    pub source_view: SourceViewState,
    pub notifications: Vec<Notification>,
}

impl App {
    pub fn new(config: TuiConfig, fetcher: Arc<dyn SourceFetcher>) -> Self {
        let coordinator = RequestCoordinator::new(fetcher, config.query_defaults());
        let store_events = coordinator.subscribe();
        Self {
            config,
            active_view: View::SourceBrowser,
            coordinator,
            store_events,
            page_index: 0,
            source_view: SourceViewState::default(),
            notifications: Vec::new(),
        }
    }

    /// Navigate to a start index and request its collection.
    pub fn request_page(&mut self, index: i64) {
        self.page_index = index;
        self.coordinator.request_collection(index, None);
    }

    pub fn next_page(&mut self) {
        self.request_page(advance(self.page_index, self.config.page_step));
    }

    pub fn prev_page(&mut self) {
        self.request_page(retreat(self.page_index, self.config.page_step));
    }

    pub fn refresh(&mut self) {
        self.coordinator.request_collection(REFRESH_KEY, None);
    }

    /// Submit a filtered query for the selected source and switch to the
    /// query view.
    pub fn submit_selected(&mut self) {
        match self.source_view.selected.clone() {
            Some(name) => {
                self.coordinator.request_collection(SUBMIT_KEY, Some(&name));
                self.active_view = View::QueryInspector;
            }
            None => self.notify(NotificationLevel::Warning, "No source selected"),
        }
    }

    pub fn select_next(&mut self) {
        self.source_view.selected =
            select_next_name(&self.source_names(), self.source_view.selected.as_deref());
    }

    pub fn select_previous(&mut self) {
        self.source_view.selected =
            select_prev_name(&self.source_names(), self.source_view.selected.as_deref());
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    pub fn dismiss_notifications(&mut self) {
        self.notifications.clear();
    }

    /// Apply completions that arrived since the last tick and surface the
    /// interesting ones as notifications.
    pub fn on_tick(&mut self) {
        if self.coordinator.pump() > 0 {
            self.drain_store_events();
            self.retain_valid_selection();
        }
    }

    fn drain_store_events(&mut self) {
        loop {
            match self.store_events.try_recv() {
                Ok(Action::RequestFailed { error, .. }) => {
                    self.notify(NotificationLevel::Error, format!("Fetch failed: {}", error));
                }
                Ok(Action::QueryCompleted { for_source, .. }) => {
                    self.notify(
                        NotificationLevel::Success,
                        format!("Query completed for {}", for_source),
                    );
                }
                Ok(Action::RequestStarted { .. }) | Ok(Action::RequestCompleted { .. }) => {}
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }

    fn retain_valid_selection(&mut self) {
        if let Some(selected) = &self.source_view.selected {
            let still_present = self
                .coordinator
                .state()
                .sources
                .iter()
                .any(|source| &source.display_name == selected);
            if !still_present {
                self.source_view.selected = None;
            }
        }
    }

    fn source_names(&self) -> Vec<String> {
        self.coordinator
            .state()
            .sources
            .iter()
            .map(|source| source.display_name.clone())
            .collect()
    }
}

/// Next start index; pagination never leaves the non-negative page range,
/// which is reserved apart from the sentinels.
pub fn advance(index: i64, step: i64) -> i64 {
    index + step
}

pub fn retreat(index: i64, step: i64) -> i64 {
    (index - step).max(0)
}

fn select_next_name(names: &[String], selected: Option<&str>) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    let index = selected.and_then(|name| names.iter().position(|n| n == name));
    let next = match index {
        Some(i) => (i + 1) % names.len(),
        None => 0,
    };
    Some(names[next].clone())
}

fn select_prev_name(names: &[String], selected: Option<&str>) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    let index = selected.and_then(|name| names.iter().position(|n| n == name));
    let prev = match index {
        Some(0) | None => names.len() - 1,
        Some(i) => i - 1,
    };
    Some(names[prev].clone())
}
