// Status bar widget: connection dot, assigned symbol, status text.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::{ConnectionState, Outcome};
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [connection indicator] [symbol] | [status text]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let snapshot = &state.snapshot;
    let mut spans = Vec::new();

    let (dot, dot_color) = connection_indicator(snapshot.connection);
    spans.push(Span::styled(
        format!(" {} ", dot),
        Style::default().fg(dot_color),
    ));

    spans.push(Span::styled(
        symbol_label(state),
        Style::default().fg(Color::White),
    ));

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));

    spans.push(Span::styled(
        snapshot.status.clone(),
        status_style(state),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Return the connection dot character and its color.
pub fn connection_indicator(state: ConnectionState) -> (&'static str, Color) {
    match state {
        ConnectionState::Connecting => ("●", Color::Yellow),
        ConnectionState::Open => ("●", Color::Green),
        ConnectionState::Closed => ("●", Color::Red),
    }
}

/// "You are X" once a symbol is assigned.
pub fn symbol_label(state: &ViewState) -> String {
    match state.snapshot.own_symbol {
        Some(symbol) => format!("You are {}", symbol),
        None => "No symbol yet".to_string(),
    }
}

fn status_style(state: &ViewState) -> Style {
    let base = Style::default().add_modifier(Modifier::BOLD);
    match state.snapshot.outcome {
        Some(Outcome::Win) => base.fg(Color::Green),
        Some(Outcome::Loss) => base.fg(Color::Red),
        Some(Outcome::Tie) => base.fg(Color::Yellow),
        None if state.snapshot.is_my_turn => base.fg(Color::Cyan),
        None => Style::default().fg(Color::White),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Symbol;

    #[test]
    fn connection_indicator_colors() {
        assert_eq!(
            connection_indicator(ConnectionState::Connecting),
            ("●", Color::Yellow)
        );
        assert_eq!(connection_indicator(ConnectionState::Open), ("●", Color::Green));
        assert_eq!(connection_indicator(ConnectionState::Closed), ("●", Color::Red));
    }

    #[test]
    fn symbol_label_before_and_after_assignment() {
        let mut state = ViewState::default();
        assert_eq!(symbol_label(&state), "No symbol yet");
        state.snapshot.own_symbol = Some(Symbol::O);
        assert_eq!(symbol_label(&state), "You are O");
    }

    #[test]
    fn outcome_colors_status() {
        let mut state = ViewState::default();
        state.snapshot.outcome = Some(Outcome::Win);
        assert_eq!(status_style(&state).fg, Some(Color::Green));
        state.snapshot.outcome = Some(Outcome::Loss);
        assert_eq!(status_style(&state).fg, Some(Color::Red));
    }

    #[test]
    fn render_shows_status_text() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.snapshot.own_symbol = Some(Symbol::X);
        state.snapshot.status = "It's your turn!".into();
        state.snapshot.is_my_turn = true;
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("You are X"));
        assert!(text.contains("It's your turn!"));
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
