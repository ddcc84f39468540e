//! Terminal User Interface Module
//!
//! Interactive client for the CSV summarization backend, built with Ratatui.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────┐
//! │  Parameters  │  Tablesum — CSV Summarizing Agent             ●  │
//! │              ├──────────────────────────────────────────────────┤
//! │  API key     │  ┌─ Session ───────────────────────────────────┐ │
//! │  Model       │  │ ● Upload → ○ Summarize → ○ Done             │ │
//! │  Temperature │  └─────────────────────────────────────────────┘ │
//! │  Top P       │  [1] Home  [2] Summarize CSV  [3] Analyze CSV    │
//! │              │  ┌─ Summarize CSV ─────────────────────────────┐ │
//! │              │  │  summary text / preview table               │ │
//! │              │  └─────────────────────────────────────────────┘ │
//! │              │  Ready │ [Ctrl+O] Open [Ctrl+Q] Quit [F1] Help   │
//! └──────────────┴──────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, Mode};
pub use event::{AppAction, EventHandler};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(config: crate::config::Config) -> anyhow::Result<()> {
    info!("Starting TUI mode");

    let mut terminal = init_terminal()?;
    let mut app = App::new(config);
    let mut events = EventHandler::new(std::time::Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Apply session events from the upload orchestrator
        app.poll_events();

        if let Some(action) = events.try_next().await {
            app.handle_action(action).await;
            if app.should_quit {
                break;
            }
        }

        // Small yield to prevent a busy loop
        tokio::task::yield_now().await;
    }

    info!("TUI exited normally");
    Ok(())
}
