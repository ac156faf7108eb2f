//! Tradely terminal dashboard.
//!
//! Environment:
//! - `TRADELY_API_URL`, `TRADELY_MARKET_WS_URL`, `TRADELY_ALERTS_WS_URL`: backend endpoints
//! - `TRADELY_PIN_FILE`: pinned symbols (default `pinned_tickers.json`)
//! - `TRADELY_FLASH_MS`: price highlight duration (default 500)
//! - `TRADELY_READ_TIMEOUT_SECS`: idle period before a push socket is reconnected (default 60)
//! - `TRADELY_LOG_FILE`: log destination (default `tradely.log`), filtered by `RUST_LOG`

mod app;
mod ui;

use std::{
    error::Error,
    fs::File,
    io,
    sync::Mutex,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use rustls::crypto::ring::default_provider;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tradely_data::{
    ApiClient, LiveDataHub,
    config::TradelyConfig,
    view::{FlashTracker, JsonFilePinStore, Pins},
};

use crate::app::App;

const DEFAULT_LOG_FILE: &str = "tradely.log";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Logs go to a file; stdout belongs to the terminal UI.
fn init_logging() -> Result<(), Box<dyn Error>> {
    let path = std::env::var("TRADELY_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = File::options().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = default_provider().install_default();
    init_logging()?;

    let config = TradelyConfig::from_env();
    config.validate()?;
    info!(api = %config.api_url, market = %config.hub.market.url, alerts = %config.hub.alerts.url, "starting");

    let api = ApiClient::new(&config.api_url)?;
    let hub = LiveDataHub::spawn(config.hub.clone());
    let pins = Pins::load(JsonFilePinStore::new(&config.pin_file));
    let (task_tx, mut task_rx) = mpsc::unbounded_channel();
    let mut app = App::new(
        api,
        hub.reader(),
        pins,
        FlashTracker::new(config.flash_duration),
        task_tx,
    );

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result: Result<(), Box<dyn Error>> = loop {
        let now = Instant::now();
        app.poll_hub(now);
        while let Ok(task) = task_rx.try_recv() {
            app.on_task(task);
        }

        if let Err(error) = terminal.draw(|f| ui::render_ui(f, &app, now)) {
            break Err(error.into());
        }

        match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => app.on_key(key),
                Ok(_) => {}
                Err(error) => break Err(error.into()),
            },
            Ok(false) => {}
            Err(error) => break Err(error.into()),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    hub.shutdown().await;
    info!("stopped");
    result
}
