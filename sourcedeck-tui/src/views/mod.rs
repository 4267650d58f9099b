//! View rendering dispatch.

pub mod config;
pub mod query;
pub mod sources;

use crate::nav::View;
use crate::notifications::NotificationLevel;
use crate::state::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::SourceBrowser => sources::render(f, app, layout[1]),
        View::QueryInspector => query::render(f, app, layout[1]),
        View::ConfigViewer => config::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let loading = if app.coordinator.state().is_loading {
        " | Loading..."
    } else {
        ""
    };
    let title = format!(
        "SOURCEDECK | {} | start index {}{}",
        app.active_view.title(),
        app.page_index,
        loading
    );
    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(block, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let help = "j/k move • [ / ] page • r refresh • s query • Tab view • q quit";
    let (text, style) = if let Some(note) = app.notifications.last() {
        let (label, color) = match note.level {
            NotificationLevel::Info => ("INFO", Color::Cyan),
            NotificationLevel::Warning => ("WARN", Color::Yellow),
            NotificationLevel::Error => ("ERROR", Color::Red),
            NotificationLevel::Success => ("SUCCESS", Color::Green),
        };
        (
            format!("{}: {}", label, note.message),
            Style::default().fg(color),
        )
    } else {
        (help.to_string(), Style::default().fg(Color::DarkGray))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}
