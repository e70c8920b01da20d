// Terminal game surface: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the game session. The app
// orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{CellId, GameSnapshot, LogEntry, UiUpdate, UserCommand};
use crate::session::Session;

use layout::build_layout;

/// Oldest log lines are dropped past this many entries.
pub const MAX_LOG_ENTRIES: usize = 200;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator.
/// The `render_frame` function reads this struct to draw the screen.
pub struct ViewState {
    /// Latest session snapshot from the app.
    pub snapshot: GameSnapshot,
    /// Board cell highlighted for keyboard play.
    pub cursor: CellId,
    /// Timestamped status lines, oldest first.
    pub log: Vec<LogEntry>,
    /// Whether the quit confirmation dialog is showing.
    pub confirm_quit: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            snapshot: Session::new().snapshot(),
            cursor: CellId::CENTER,
            log: Vec::new(),
            confirm_quit: false,
        }
    }
}

impl ViewState {
    pub fn push_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
        if self.log.len() > MAX_LOG_ENTRIES {
            let excess = self.log.len() - MAX_LOG_ENTRIES;
            self.log.drain(..excess);
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.snapshot = *snapshot;
        }
        UiUpdate::Log(entry) => {
            state.push_log(entry);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete game screen.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::board::render(frame, layout.board, state);
    widgets::game_log::render(frame, layout.game_log, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Set panic hook to restore terminal on crash.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    // ~30fps
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Channel closed: app is shutting down
                    None => break Ok(()),
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse, resize, focus: redrawn on the next tick
                    }
                    Some(Err(e)) => break Err(anyhow::Error::from(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::from(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ConnectionState, Symbol};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert_eq!(state.snapshot.connection, ConnectionState::Connecting);
        assert_eq!(state.snapshot.status, "Connecting to the game server...");
        assert!(state.snapshot.cells.iter().all(|c| c.is_none()));
        assert_eq!(state.cursor, CellId::CENTER);
        assert!(state.log.is_empty());
        assert!(!state.confirm_quit);
    }

    #[test]
    fn apply_ui_update_state_snapshot_replaces_snapshot() {
        let mut state = ViewState::default();
        let mut session = Session::new();
        session.on_open();
        apply_ui_update(
            &mut state,
            UiUpdate::StateSnapshot(Box::new(session.snapshot())),
        );
        assert_eq!(state.snapshot.connection, ConnectionState::Open);
        assert_eq!(state.snapshot.status, "Waiting for an opponent.");
    }

    #[test]
    fn apply_ui_update_log_appends() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Log(LogEntry::now("first")));
        apply_ui_update(&mut state, UiUpdate::Log(LogEntry::now("second")));
        let texts: Vec<&str> = state.log.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn log_is_capped_dropping_oldest() {
        let mut state = ViewState::default();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            state.push_log(LogEntry::now(format!("line {i}")));
        }
        assert_eq!(state.log.len(), MAX_LOG_ENTRIES);
        assert_eq!(state.log[0].text, "line 5");
        assert_eq!(
            state.log.last().unwrap().text,
            format!("line {}", MAX_LOG_ENTRIES + 4)
        );
    }

    #[test]
    fn render_frame_shows_status_and_marks() {
        let mut state = ViewState::default();
        state.snapshot.connection = ConnectionState::Open;
        state.snapshot.own_symbol = Some(Symbol::X);
        state.snapshot.opponent_symbol = Some(Symbol::O);
        state.snapshot.cells[0] = Some(Symbol::X);
        state.snapshot.cells[8] = Some(Symbol::O);
        state.snapshot.status = "Your opponent is strategizing.".into();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| render_frame(frame, &state))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Your opponent is strategizing."));
        assert!(text.contains('X'));
        assert!(text.contains('O'));
    }

    #[test]
    fn render_frame_with_quit_dialog() {
        let state = ViewState {
            confirm_quit: true,
            ..ViewState::default()
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| render_frame(frame, &state))
            .unwrap();
        assert!(buffer_text(&terminal).contains("Leave the game?"));
    }

    #[test]
    fn render_frame_small_terminal_does_not_panic() {
        let state = ViewState::default();
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        terminal
            .draw(|frame| render_frame(frame, &state))
            .unwrap();
    }
}
