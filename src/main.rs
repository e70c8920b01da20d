// Tic-tac-toe client entry point.
//
// Startup sequence:
// 1. Load config (copies defaults on first run)
// 2. Initialize tracing (log to file, not terminal)
// 3. Create mpsc channels
// 4. Spawn WebSocket client task
// 5. Spawn app logic task
// 6. Run the TUI until the user quits
// 7. Cleanup on exit

use tictactoe_client::app;
use tictactoe_client::config::{self, LoggingConfig};
use tictactoe_client::tui;
use tictactoe_client::ws_client;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 2. Initialize tracing (log to file, not terminal)
    init_tracing(&config.logging)?;
    info!("Tic-tac-toe client starting up");
    info!(
        "Config loaded: server={}, registration timeout {}s",
        config.server.url, config.game.registration_timeout_secs
    );

    // 3. Create mpsc channels
    let (ws_tx, ws_rx) = mpsc::channel(256);
    let (out_tx, out_rx) = mpsc::channel(64);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::from_config(&config, out_tx);

    // 4. Spawn WebSocket client task
    let server_url = config.server.url.clone();
    let ws_handle = tokio::spawn(async move {
        if let Err(e) = ws_client::run(&server_url, ws_tx, out_rx).await {
            error!("WebSocket client error: {:#}", e);
        }
    });

    // 5. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(ws_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. Run the TUI event loop (blocking until user quits)
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 7. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    // The connection stays open until the socket task is stopped.
    ws_handle.abort();

    info!("Tic-tac-toe client shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join(&logging.dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join(&logging.file))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&logging.filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
