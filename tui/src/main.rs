//! Hydrant Stage Entry Point
//!
//! Plays the Silver Hydrant landing stage in the terminal.
//!
//! Usage:
//!   hydrant-stage
//!
//! Environment:
//!   HYDRANT_LOG      Log filter (default: info), written to the log file
//!   HYDRANT_*        Timing and star overrides (see `hydrant_conductor::config`)
//!   REDUCE_MOTION    `1` for reduced motion, `none` to freeze the sky

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use hydrant_conductor::{load_config, MonotonicClock};
use hydrant_stage::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: hydrant-stage requires a terminal (TTY)");
        eprintln!("Run it interactively, or over ssh with -t.");
        std::process::exit(1);
    }

    let log_path = init_logging()?;
    let config = load_config().context("Failed to load stage configuration")?;
    tracing::info!(
        source = %config.source(),
        motion = ?config.motion,
        stars = config.stars.count,
        log = %log_path.display(),
        "Starting stage"
    );

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let size = terminal.size()?;
    let mut app = App::new(&config, Arc::new(MonotonicClock::new()), (size.width, size.height));
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Log to a file so the alternate screen stays clean
fn init_logging() -> anyhow::Result<PathBuf> {
    let path = std::env::temp_dir().join("hydrant-stage.log");
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("HYDRANT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("hydrant_stage=info,hydrant_conductor=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(path)
}
