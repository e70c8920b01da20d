// Game log widget: timestamped status lines, newest at the bottom.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::protocol::LogEntry;
use crate::tui::ViewState;

/// Render the game log into the given area.
///
/// Shows as many of the most recent entries as fit.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title("Game Log");

    if state.log.is_empty() {
        let paragraph = Paragraph::new("  Nothing yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    // Visible row count: subtract 2 for borders
    let visible_rows = (area.height as usize).saturating_sub(2);
    let skip = state.log.len().saturating_sub(visible_rows);

    let items: Vec<ListItem> = state.log[skip..]
        .iter()
        .map(|entry| ListItem::new(format_entry(entry)))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// "[HH:MM:SS] text"
pub fn format_entry(entry: &LogEntry) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("[{}] ", entry.timestamp.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(entry.text.clone()),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn entry_at(h: u32, m: u32, s: u32, text: &str) -> LogEntry {
        LogEntry {
            timestamp: Local.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap(),
            text: text.to_string(),
        }
    }

    fn rendered_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn format_entry_prefixes_timestamp() {
        let line = format_entry(&entry_at(9, 5, 7, "You win!"));
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "[09:05:07] You win!");
    }

    #[test]
    fn empty_log_shows_placeholder() {
        let state = ViewState::default();
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        assert!(rendered_rows(&terminal)[1].contains("Nothing yet."));
    }

    #[test]
    fn overflow_shows_most_recent_entries() {
        let mut state = ViewState::default();
        for i in 0..10 {
            state.push_log(entry_at(12, 0, i, &format!("entry {i}")));
        }
        // 3 visible rows inside the borders
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();

        let rows = rendered_rows(&terminal);
        assert!(rows[1].contains("entry 7"));
        assert!(rows[2].contains("entry 8"));
        assert!(rows[3].contains("entry 9"));
        assert!(!rows.iter().any(|r| r.contains("entry 6")));
    }
}
