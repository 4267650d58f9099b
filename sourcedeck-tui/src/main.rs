//! Sourcedeck TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sourcedeck_tui::api_client::RestClient;
use sourcedeck_tui::config::TuiConfig;
use sourcedeck_tui::error::TuiError;
use sourcedeck_tui::events::TuiEvent;
use sourcedeck_tui::keys::{map_key, KeyAction};
use sourcedeck_tui::state::App;
use sourcedeck_tui::views::render_view;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config = TuiConfig::load()?;
    let client = RestClient::new(&config)?;
    let mut app = App::new(config, Arc::new(client));
    app.request_page(start_index_from_args());

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx.clone());

    let tick_rate = Duration::from_millis(app.config.refresh_interval_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                let _ = event_tx.send(TuiEvent::Tick).await;
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, event) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                match evt {
                    CrosstermEvent::Key(key) => {
                        let _ = sender.blocking_send(TuiEvent::Input(key));
                    }
                    CrosstermEvent::Resize(width, height) => {
                        let _ = sender.blocking_send(TuiEvent::Resize { width, height });
                    }
                    _ => {}
                }
            }
        }
    });
}

fn handle_event(app: &mut App, event: TuiEvent) -> bool {
    match event {
        TuiEvent::Input(key) => {
            if let Some(action) = map_key(key) {
                return handle_action(app, action);
            }
        }
        TuiEvent::Tick => app.on_tick(),
        TuiEvent::Resize { .. } => {}
    }
    false
}

fn handle_action(app: &mut App, action: KeyAction) -> bool {
    match action {
        KeyAction::Quit => return true,
        KeyAction::NextView => app.active_view = app.active_view.next(),
        KeyAction::PrevView => app.active_view = app.active_view.previous(),
        KeyAction::MoveDown => app.select_next(),
        KeyAction::MoveUp => app.select_previous(),
        KeyAction::NextPage => app.next_page(),
        KeyAction::PrevPage => app.prev_page(),
        KeyAction::Refresh => app.refresh(),
        KeyAction::SubmitQuery => app.submit_selected(),
        KeyAction::Cancel => app.dismiss_notifications(),
    }
    false
}

/// The start-index route parameter: `--start <n>`, defaulting to 0 on a
/// missing or unparseable value.
fn start_index_from_args() -> i64 {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--start" {
            return args
                .next()
                .and_then(|value| value.parse::<i64>().ok())
                .unwrap_or(0);
        }
    }
    0
}
