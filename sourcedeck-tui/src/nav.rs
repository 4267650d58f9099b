//! Navigation and view switching utilities.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    SourceBrowser,
    QueryInspector,
    ConfigViewer,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::SourceBrowser => "Sources",
            View::QueryInspector => "Query",
            View::ConfigViewer => "Config",
        }
    }

    pub fn all() -> &'static [View] {
        &[View::SourceBrowser, View::QueryInspector, View::ConfigViewer]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> View {
        let idx = self.index();
        let all = Self::all();
        all[(idx + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let idx = self.index();
        let all = Self::all();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}
