//! Config viewer.

use crate::state::App;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let paragraph = Paragraph::new(format!("{:#?}", app.config))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Configuration").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
