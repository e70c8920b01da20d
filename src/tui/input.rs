// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (cursor movement,
// the quit dialog).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::protocol::{CellId, UserCommand, BOARD_SIDE};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator (a cell click or Quit). Returns `None` when the key
/// press was handled locally by mutating `ViewState`.
///
/// A click is only forwarded while the latest snapshot says it is the
/// player's turn and the cell is empty. The session checks again when the
/// command arrives.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress; ignoring
    // non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    // Quit confirmation mode: only y/q confirm, n/Esc cancel, everything else blocked
    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            move_cursor(view_state, -1, 0);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_cursor(view_state, 1, 0);
            None
        }
        KeyCode::Left | KeyCode::Char('h') => {
            move_cursor(view_state, 0, -1);
            None
        }
        KeyCode::Right | KeyCode::Char('l') => {
            move_cursor(view_state, 0, 1);
            None
        }

        KeyCode::Enter | KeyCode::Char(' ') => click(view_state, view_state.cursor),

        // Direct selection: 1 is top-left, 9 bottom-right
        KeyCode::Char(c @ '1'..='9') => {
            let cell = digit_cell(c)?;
            view_state.cursor = cell;
            click(view_state, cell)
        }

        // Quit: enter confirmation mode instead of quitting immediately
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

/// Handle key events while in quit confirmation mode.
///
/// - `y` or `q` confirms quit (sends UserCommand::Quit)
/// - `n` or `Esc` cancels (returns to normal mode)
/// - All other keys are blocked (no-op)
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

fn click(view_state: &ViewState, cell: CellId) -> Option<UserCommand> {
    let snapshot = &view_state.snapshot;
    if snapshot.is_my_turn && snapshot.cells[cell.index()].is_none() {
        Some(UserCommand::ClickCell(cell))
    } else {
        None
    }
}

/// Move the cursor by a row/column delta, clamped to the board edges.
fn move_cursor(view_state: &mut ViewState, d_row: isize, d_col: isize) {
    let max = BOARD_SIDE as isize - 1;
    let row = (view_state.cursor.row() as isize + d_row).clamp(0, max);
    let col = (view_state.cursor.col() as isize + d_col).clamp(0, max);
    if let Some(cell) = CellId::from_row_col(row as usize, col as usize) {
        view_state.cursor = cell;
    }
}

fn digit_cell(c: char) -> Option<CellId> {
    let n = c.to_digit(10)? as usize;
    CellId::new(n.checked_sub(1)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
