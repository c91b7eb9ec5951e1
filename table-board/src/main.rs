//! Table Board - terminal front end for table orders
//!
//! Run: cargo run -p table-board
//!
//! Reads `BACKEND_URL`, `TABLE_COUNT`, `REQUEST_TIMEOUT_SECS`, `LOG_LEVEL`
//! and `LOG_DIR` from the environment (or a `.env` file).

mod app;
mod logger;
mod ui;

use anyhow::Context;
use app::App;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::prelude::*;
use std::io::{self, Stdout};
use std::time::Duration;
use table_client::{ClientConfig, OrderApi, PushSubscription, TableStore, WriteOutcome};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境与日志
    dotenv::dotenv().ok();
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_dir = std::env::var("LOG_DIR").ok();
    logger::init_logger(&log_level, log_dir.as_deref());

    // 2. 配置
    let config = ClientConfig::from_env();
    tracing::info!(
        base_url = %config.base_url,
        tables = config.table_count,
        "Table board starting"
    );
    let api = config
        .build_api()
        .context("Failed to create order service client")?;

    // 3. 初始加载 (失败时保留空桌)
    let mut store = TableStore::new(api, config.table_count);
    if store.load_all().await.is_err() {
        tracing::warn!("Starting with empty tables");
    }

    // 4. 订阅推送
    let (push_tx, push_rx) = mpsc::channel(32);
    let subscription = match PushSubscription::subscribe(
        &config.push_url(),
        config.request_timeout(),
        push_tx,
    )
    .await
    {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            tracing::warn!("Live updates unavailable: {}", e);
            None
        }
    };

    let (write_tx, write_rx) = mpsc::channel(32);
    let mut app = App::new(store, write_tx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, push_rx, write_rx, subscription.as_ref()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(subscription) = subscription {
        subscription.shutdown().await;
    }
    tracing::info!("Table board stopped");

    res
}

async fn run_app<A: OrderApi + Clone + 'static>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<A>,
    mut push_rx: mpsc::Receiver<String>,
    mut write_rx: mpsc::Receiver<WriteOutcome>,
    subscription: Option<&PushSubscription>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    // Redraw tick for the log panel and connection status
    let mut tick = tokio::time::interval(Duration::from_millis(250));

    while !app.should_quit {
        app.push_connected = subscription.is_some_and(PushSubscription::is_active);
        terminal.draw(|f| ui::draw(f, app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Terminal input failed"),
                None => break,
            },

            Some(payload) = push_rx.recv() => app.on_push_payload(&payload),

            Some(outcome) = write_rx.recv() => app.on_write_outcome(outcome),

            _ = tick.tick() => {}
        }
    }

    Ok(())
}
