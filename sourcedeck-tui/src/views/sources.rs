//! Source browser view.

use crate::state::App;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Row, Table, TableState},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let state = app.coordinator.state();

    let rows: Vec<Row> = state
        .sources
        .iter()
        .map(|source| {
            Row::new(vec![
                source.display_name.clone(),
                source.fields.join(", "),
            ])
        })
        .collect();

    let mut table_state = TableState::default();
    if let Some(selected) = &app.source_view.selected {
        if let Some(index) = state
            .sources
            .iter()
            .position(|s| &s.display_name == selected)
        {
            table_state.select(Some(index));
        }
    }

    let table = Table::new(
        rows,
        [Constraint::Percentage(30), Constraint::Percentage(70)],
    )
    .header(Row::new(vec!["Name", "Fields"]).style(Style::default().add_modifier(Modifier::BOLD)))
    .block(Block::default().title("Data Sources").borders(Borders::ALL))
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    f.render_stateful_widget(table, area, &mut table_state);
}
