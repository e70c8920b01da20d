// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones for the game screen:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +-------------------------+------------------------+
// | Board (board width)      | Game Log (fill)        |
// |                          |                        |
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the board panel: three 5-column cells, two separators, borders.
pub const BOARD_PANEL_WIDTH: u16 = 3 * 5 + 2 + 2;
/// Height of the board panel: three 1-row cells, two separators, borders.
pub const BOARD_PANEL_HEIGHT: u16 = 3 + 2 + 2;

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: connection dot, own symbol, status text.
    pub status_bar: Rect,
    /// Left side of the middle section: the 3x3 board.
    pub board: Rect,
    /// Right side of the middle section: timestamped game log.
    pub game_log: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the screen layout from the available terminal area.
///
/// The board keeps its natural size on large terminals; the game log takes
/// whatever width is left.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | middle(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(BOARD_PANEL_HEIGHT),
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let middle = vertical[1];
    let help_bar = vertical[2];

    // Horizontal: board | log
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(BOARD_PANEL_WIDTH), Constraint::Min(10)])
        .split(middle);

    AppLayout {
        status_bar,
        board: horizontal[0],
        game_log: horizontal[1],
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
