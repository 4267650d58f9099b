//! Query inspector view: the accepted filter and its opaque payload.

use crate::state::App;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let state = app.coordinator.state();
    let filter = state.filter.as_deref().unwrap_or("(none)");
    let body = match &state.query_result {
        Some(result) => serde_json::to_string_pretty(result)
            .unwrap_or_else(|_| result.to_string()),
        None => "No query submitted yet. Select a source and press 's'.".to_string(),
    };

    let paragraph = Paragraph::new(format!("Filter: {}\n\n{}", filter, body))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Query Result").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
