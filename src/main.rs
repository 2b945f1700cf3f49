use std::io;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use booklens::config::AppConfig;
use booklens::core::gemini::GeminiClient;
use booklens::tui::app::AppState;
use booklens::tui::services::Services;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load();

    // Initialize logging (file-only — stdout belongs to the TUI)
    let _log_guard = booklens::core::logging::init_tui(config.data.data_dir.clone());
    log::info!("BookLens v{} starting", booklens::VERSION);

    // Backend wiring: one event channel, one Gemini client
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let gemini = GeminiClient::from_env(config.gemini.model.clone());
    let services = Services::new(gemini, event_tx.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let tick_rate = Duration::from_millis(config.tui.tick_rate_ms);
    let mut app = AppState::new(&config, event_rx, services);
    let result = app.run(&mut terminal, tick_rate).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
