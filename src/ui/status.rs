//! Full-screen status views
//!
//! Shown in place of a screen's content while its first data is loading or
//! after its load failed.

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Spinner glyph for the current 100ms slot
fn spinner_glyph() -> char {
    let slot = Utc::now().timestamp_subsec_millis() / 100;
    SPINNER[slot as usize % SPINNER.len()]
}

/// Renders a centered spinner with `message`
pub fn render_loading(frame: &mut Frame, message: &str) {
    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new(format!("{} {}", spinner_glyph(), message))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Renders a full-screen error with the failure message and the keys that recover from it
pub fn render_error(frame: &mut Frame, title: &str, message: &str, hint: &str) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Length(7),
            Constraint::Percentage(35),
        ])
        .split(area);

    let lines = vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

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
    fn test_loading_shows_message_and_spinner() {
        let backend = TestBackend::new(60, 12);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| render_loading(frame, "Loading cities"))
            .unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Loading cities"));
        assert!(SPINNER.iter().any(|glyph| content.contains(*glyph)));
    }

    #[test]
    fn test_error_shows_message_and_hint() {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                render_error(
                    frame,
                    "Something went wrong",
                    "Failed to fetch data: server responded with status 503",
                    "r retry",
                )
            })
            .unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Something went wrong"));
        assert!(content.contains("status 503"));
        assert!(content.contains("r retry"));
    }
}
