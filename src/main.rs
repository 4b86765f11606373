use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use akshara_core::Config;
use app::App;
use tui::{EventHandler, Tui, TICK_RATE};

/// Log to a file; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .context("Could not determine data directory")?
        .join("akshara");
    fs::create_dir_all(&log_dir)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("akshara.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = Config::resolve()?;
    info!(language = config.language.code(), backend = %config.backend_url, "config resolved");
    let mut app = App::new(config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    info!("exiting");
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !app.should_quit {
        // Pick up finished requests before drawing
        app.poll_tasks().await;

        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => handler::handle_event(app, event),
            Some(poll) = app.poll_events.recv() => app.apply_poll(poll),
            else => break,
        }
    }

    Ok(())
}
