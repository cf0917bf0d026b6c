mod app;
mod form;
mod input;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use armory_client::Backend;
use crossterm::{
    event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::info;

pub use app::PanelApp;

use crate::config::Settings;
use crate::error::ArmoryError;

pub async fn run<B: Backend + 'static>(backend: Arc<B>, settings: &Settings) -> Result<(), ArmoryError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let mut app = PanelApp::new(backend, settings);
    info!(base_url = %settings.base_url, "Panel started");

    let result = run_loop(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut PanelApp,
) -> Result<(), ArmoryError> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Poll with a timeout so finished requests are picked up between keys
        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;
            input::handle_event(app, event);
        }

        app.poll_responses();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
