// Board widget: the 3x3 grid with the keyboard cursor.
//
//   X  │  2  │  O
// ─────┼─────┼─────
//   4  │  X  │  6
// ─────┼─────┼─────
//   7  │  8  │  9
//
// Empty cells show their digit key in dark gray. The cursor cell is drawn
// reversed. The border turns green while it is the player's turn.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::protocol::{CellId, Symbol, BOARD_SIDE};
use crate::tui::ViewState;

const CELL_WIDTH: usize = 5;

/// Render the board into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let border_style = if state.snapshot.is_my_turn {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let mut lines = Vec::with_capacity(BOARD_SIDE * 2 - 1);
    for row in 0..BOARD_SIDE {
        if row > 0 {
            lines.push(separator_line());
        }
        lines.push(row_line(state, row));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title("Board"),
    );
    frame.render_widget(paragraph, area);
}

fn row_line(state: &ViewState, row: usize) -> Line<'static> {
    let grid = Style::default().fg(Color::DarkGray);
    let mut spans = Vec::with_capacity(BOARD_SIDE * 2 - 1);
    for col in 0..BOARD_SIDE {
        if col > 0 {
            spans.push(Span::styled("│", grid));
        }
        if let Some(cell) = CellId::from_row_col(row, col) {
            spans.push(cell_span(state, cell));
        }
    }
    Line::from(spans)
}

fn separator_line() -> Line<'static> {
    let segment = "─".repeat(CELL_WIDTH);
    let text = vec![segment; BOARD_SIDE].join("┼");
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

/// The text and style for one cell.
pub fn cell_span(state: &ViewState, cell: CellId) -> Span<'static> {
    let (label, mut style) = match state.snapshot.cells[cell.index()] {
        Some(symbol) => (
            symbol.to_string(),
            Style::default()
                .fg(symbol_color(symbol))
                .add_modifier(Modifier::BOLD),
        ),
        None => (
            (cell.index() + 1).to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };
    if cell == state.cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("{:^width$}", label, width = CELL_WIDTH), style)
}

pub fn symbol_color(symbol: Symbol) -> Color {
    match symbol {
        Symbol::X => Color::Cyan,
        Symbol::O => Color::Magenta,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn cell(i: usize) -> CellId {
        CellId::new(i).unwrap()
    }

    #[test]
    fn empty_cell_shows_digit_hint() {
        let state = ViewState::default();
        let span = cell_span(&state, cell(0));
        assert_eq!(span.content, "  1  ");
        assert_eq!(span.style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn marked_cell_shows_symbol() {
        let mut state = ViewState::default();
        state.snapshot.cells[2] = Some(Symbol::O);
        let span = cell_span(&state, cell(2));
        assert_eq!(span.content, "  O  ");
        assert_eq!(span.style.fg, Some(Color::Magenta));
    }

    #[test]
    fn cursor_cell_is_reversed() {
        let state = ViewState::default();
        assert!(cell_span(&state, CellId::CENTER)
            .style
            .add_modifier
            .contains(Modifier::REVERSED));
        assert!(!cell_span(&state, cell(0))
            .style
            .add_modifier
            .contains(Modifier::REVERSED));
    }

    #[test]
    fn render_draws_rows_in_order() {
        let mut state = ViewState::default();
        state.snapshot.cells[0] = Some(Symbol::X);
        state.snapshot.cells[4] = Some(Symbol::O);
        state.snapshot.cells[8] = Some(Symbol::X);

        let mut terminal = Terminal::new(TestBackend::new(19, 7)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect()
        };
        assert_eq!(row(1), "│  X  │  2  │  3  │");
        assert_eq!(row(2), "│─────┼─────┼─────│");
        assert_eq!(row(3), "│  4  │  O  │  6  │");
        assert_eq!(row(5), "│  7  │  8  │  X  │");
    }

    #[test]
    fn border_highlights_on_my_turn() {
        let mut state = ViewState::default();
        state.snapshot.is_my_turn = true;
        let mut terminal = Terminal::new(TestBackend::new(19, 7)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let corner = &terminal.backend().buffer()[(0, 0)];
        assert_eq!(corner.fg, Color::Green);
    }

    #[test]
    fn render_does_not_panic_in_tiny_area() {
        let state = ViewState::default();
        let mut terminal = Terminal::new(TestBackend::new(5, 2)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
