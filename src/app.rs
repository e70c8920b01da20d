// Application state and orchestration logic.
//
// The central event loop that coordinates WebSocket events from the game
// server, user commands from the TUI and the registration timer. Owns the
// game session and pushes UI updates to the TUI render loop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::protocol::{self, CellId, ClientMessage, LogEntry, UiUpdate, UserCommand};
use crate::session::{Effect, Session, Status};
use crate::ws_client::WsEvent;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub session: Session,
    pub registration_timeout: Duration,
    /// When the pending registration request times out. `None` when no
    /// registration is outstanding.
    pub registration_deadline: Option<Instant>,
    /// Outbound messages, consumed by the WebSocket client task.
    pub outbound: mpsc::Sender<ClientMessage>,
}

impl AppState {
    pub fn new(registration_timeout: Duration, outbound: mpsc::Sender<ClientMessage>) -> Self {
        AppState {
            session: Session::new(),
            registration_timeout,
            registration_deadline: None,
            outbound,
        }
    }

    pub fn from_config(config: &Config, outbound: mpsc::Sender<ClientMessage>) -> Self {
        Self::new(config.game.registration_timeout(), outbound)
    }

    /// Carry out effects requested by the session.
    async fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(message) => self.send(message).await,
                Effect::StartRegistrationTimer => {
                    // An unrepresentable deadline never fires.
                    self.registration_deadline = Instant::now().checked_add(self.registration_timeout);
                    debug!(
                        "Registration timer armed for {:?}",
                        self.registration_timeout
                    );
                }
                Effect::CancelRegistrationTimer => {
                    if self.registration_deadline.take().is_some() {
                        debug!("Registration timer cancelled");
                    }
                }
            }
        }
    }

    async fn send(&self, message: ClientMessage) {
        if self.outbound.send(message).await.is_err() {
            warn!("Outbound channel closed, message dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens using `tokio::select!` on, in priority order:
/// 1. User commands from the TUI
/// 2. WebSocket events from the game server
/// 3. The registration deadline, while one is armed
///
/// Pushes UI updates through `ui_tx` for the TUI render loop. Returns when
/// the user quits or the command channel closes.
pub async fn run(
    mut ws_rx: mpsc::Receiver<WsEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    // Once the WebSocket task is gone, stop polling its channel so
    // tokio::select! never spins on a closed receiver.
    let mut ws_open = true;

    send_snapshot(&state, &ui_tx).await;

    loop {
        let deadline = state.registration_deadline;

        tokio::select! {
            // Commands first: a queued click is judged against the state the
            // player saw, not against server messages that arrived after it.
            biased;

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(UserCommand::ClickCell(cell)) => {
                        handle_click(&mut state, cell, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- WebSocket events ---
            ws_event = ws_rx.recv(), if ws_open => {
                match ws_event {
                    Some(WsEvent::Connected { url }) => {
                        info!("Connected to game server at {}", url);
                        let before = state.session.status();
                        state.session.on_open();
                        publish(&state, &ui_tx, before).await;
                    }
                    Some(WsEvent::Disconnected) => {
                        handle_disconnect(&mut state, &ui_tx).await;
                    }
                    Some(WsEvent::Message(json_str)) => {
                        handle_ws_message(&mut state, &json_str, &ui_tx).await;
                    }
                    None => {
                        info!("WebSocket channel closed");
                        ws_open = false;
                        handle_disconnect(&mut state, &ui_tx).await;
                    }
                }
            }

            // --- Registration timeout ---
            _ = wait_until(deadline), if deadline.is_some() => {
                state.registration_deadline = None;
                let before = state.session.status();
                if state.session.on_registration_timeout() {
                    warn!(
                        "No game assigned within {:?} of registering",
                        state.registration_timeout
                    );
                    publish(&state, &ui_tx, before).await;
                }
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Handle an incoming WebSocket message (JSON from the server).
async fn handle_ws_message(state: &mut AppState, json_str: &str, ui_tx: &mpsc::Sender<UiUpdate>) {
    let msg = match protocol::parse_server_message(json_str) {
        Ok(m) => m,
        Err(e) => {
            warn!("Ignoring server message: {} ({})", e, json_str);
            return;
        }
    };
    debug!("Received {} message", msg.kind());

    let before = state.session.status();
    let effects = state.session.handle_message(msg);
    state.apply_effects(effects).await;
    publish(state, ui_tx, before).await;
}

/// Handle a cell selection from the TUI.
async fn handle_click(state: &mut AppState, cell: CellId, ui_tx: &mpsc::Sender<UiUpdate>) {
    let before = state.session.status();
    match state.session.click(cell) {
        Some(message) => {
            info!("Playing {}", cell);
            state.send(message).await;
            publish(state, ui_tx, before).await;
        }
        None => {
            debug!("Ignoring click on {} (not playable now)", cell);
        }
    }
}

async fn handle_disconnect(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let before = state.session.status();
    let effects = state.session.on_close();
    state.apply_effects(effects).await;
    if state.session.status() != before {
        info!("Connection to game server closed");
        publish(state, ui_tx, before).await;
    }
}

/// Push a fresh snapshot, plus a log line when the status text changed.
async fn publish(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>, before: Status) {
    let status = state.session.status();
    if status != before {
        let _ = ui_tx.send(UiUpdate::Log(LogEntry::now(status.to_string()))).await;
    }
    send_snapshot(state, ui_tx).await;
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.session.snapshot();
    let _ = ui_tx
        .send(UiUpdate::StateSnapshot(Box::new(snapshot)))
        .await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
