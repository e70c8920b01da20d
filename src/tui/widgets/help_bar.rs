// Help bar widget: keyboard shortcut hints for the current mode.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

const PLAY_HINTS: &str = " arrows/hjkl:Move | Enter/Space:Play | 1-9:Play cell | q:Quit";
const CONFIRM_HINTS: &str = " y:Leave game | n/Esc:Stay";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        hints(state),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn hints(state: &ViewState) -> &'static str {
    if state.confirm_quit {
        CONFIRM_HINTS
    } else {
        PLAY_HINTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_follow_mode() {
        let mut state = ViewState::default();
        assert!(hints(&state).contains("1-9:Play cell"));
        state.confirm_quit = true;
        assert!(hints(&state).contains("y:Leave game"));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(100, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
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
        assert!(text.contains("q:Quit"));
    }
}
