//! City list screen rendering
//!
//! Renders the search box with its autocomplete suggestions, the city table
//! with sort indicators and filter inputs, and the footer sentinel that tells
//! whether more pages are coming.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::query::{CityField, SortDirection};
use crate::ui::status;

/// Column widths for City and Country; Timezone takes the rest
const NAME_WIDTH: usize = 28;
const COUNTRY_WIDTH: usize = 24;

/// Lines in the table block that are not city rows: title row, filter row, sentinel
const TABLE_CHROME: usize = 3;

/// Renders the city list, or a full-screen status while there is nothing to show
pub fn render(frame: &mut Frame, app: &App) {
    let store = app.store();
    if store.records().is_empty() {
        if let Some(message) = store.error() {
            status::render_error(
                frame,
                "Couldn't load cities",
                message,
                "r retry  ·  q quit",
            );
            return;
        }
        if store.is_loading() {
            status::render_loading(frame, "Loading cities…");
            return;
        }
    }

    let suggestion_count = app.suggestions().len() as u16;
    let suggestion_height = if suggestion_count > 0 {
        suggestion_count + 2
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                 // Search box
            Constraint::Length(suggestion_height), // Suggestions
            Constraint::Min(5),                    // Table
            Constraint::Length(1),                 // Help text
        ])
        .split(frame.area());

    render_search(frame, app, chunks[0]);
    if suggestion_count > 0 {
        render_suggestions(frame, app, chunks[1]);
    }
    render_table(frame, app, chunks[2]);
    render_help(frame, chunks[3], app);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Search;
    let border_color = if focused { Color::Yellow } else { Color::Cyan };

    let mut spans = vec![Span::raw(app.search_input.clone())];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    } else if app.search_input.is_empty() {
        spans.push(Span::styled(
            "Press / to search cities",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_suggestions(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .suggestions()
        .iter()
        .enumerate()
        .map(|(index, city)| {
            let highlighted = app.suggestion_index == Some(index);
            let style = if highlighted {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!(" {} ", city.ascii_name()), style),
                Span::styled(
                    format!(" {}", city.country()),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Column title with ▲/▼ when the table is sorted on it
fn column_title(app: &App, field: CityField) -> String {
    let indicator = match app.query().sort {
        Some(sort) if sort.field == field => match sort.direction {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        },
        _ => "",
    };
    format!("{}{}", field.title(), indicator)
}

fn pad(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{:<width$}", truncated, width = width)
}

fn render_filter_row(app: &App) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (field, key, width) in [
        (CityField::Name, 'n', NAME_WIDTH),
        (CityField::Country, 'c', COUNTRY_WIDTH),
        (CityField::Timezone, 't', NAME_WIDTH),
    ] {
        let editing = app.focus == Focus::Filter(field);
        let value = app.query().filters.get(field);
        let text = if editing {
            format!("{}█", value)
        } else if value.is_empty() {
            format!("[{}] filter", key)
        } else {
            value.to_string()
        };
        let style = if editing {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green)
        };
        spans.push(Span::styled(pad(&text, width), style));
    }
    Line::from(spans)
}

/// Footer line under the last row
fn sentinel_line(app: &App, displayed: usize) -> Line<'static> {
    let store = app.store();
    if let Some(message) = store.error() {
        return Line::from(Span::styled(
            format!("  {}  (r to retry)", message),
            Style::default().fg(Color::Red),
        ));
    }
    let (text, color) = if store.has_more() {
        ("Loading more cities…", Color::Cyan)
    } else if displayed == 0 {
        ("No cities match", Color::DarkGray)
    } else {
        ("No more cities to load", Color::DarkGray)
    };
    Line::from(Span::styled(format!("  {}", text), Style::default().fg(color)))
}

/// First displayed row so the selection stays visible in `visible` lines
fn scroll_start(selected: usize, visible: usize) -> usize {
    if visible == 0 || selected < visible {
        0
    } else {
        selected + 1 - visible
    }
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.rows();
    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::raw("  "),
            Span::styled(pad(&column_title(app, CityField::Name), NAME_WIDTH), header_style),
            Span::styled(
                pad(&column_title(app, CityField::Country), COUNTRY_WIDTH),
                header_style,
            ),
            Span::styled(column_title(app, CityField::Timezone), header_style),
        ]),
        render_filter_row(app),
    ];

    let inner_height = area.height.saturating_sub(2) as usize;
    let visible = inner_height.saturating_sub(TABLE_CHROME);
    let start = scroll_start(app.selected_index, visible);

    for (index, row) in rows.iter().enumerate().skip(start).take(visible) {
        let is_selected = index == app.selected_index && app.focus == Focus::Table;
        let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸ or space
        let style = if is_selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(vec![
            Span::styled(cursor, style),
            Span::styled(pad(row.city.ascii_name(), NAME_WIDTH), style),
            Span::styled(pad(row.city.country(), COUNTRY_WIDTH), style),
            Span::styled(
                row.city.timezone().to_string(),
                Style::default().fg(Color::Gray),
            ),
        ]));
    }

    lines.push(sentinel_line(app, rows.len()));

    let title = if app.store().search_text().is_empty() {
        format!(" Cities ({}) ", rows.len())
    } else {
        format!(
            " Cities matching \"{}\" ({}) ",
            app.store().search_text(),
            rows.len()
        )
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the help text at the bottom of the screen
fn render_help(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(Color::Yellow);
    let help_spans = match app.focus {
        Focus::Search => vec![
            Span::styled("↑/↓", key_style),
            Span::raw(" Suggestion  "),
            Span::styled("Enter", key_style),
            Span::raw(" Search  "),
            Span::styled("Esc", key_style),
            Span::raw(" Done"),
        ],
        Focus::Filter(field) => vec![
            Span::raw(format!("Filtering {}  ", field.title())),
            Span::styled("Enter/Esc", key_style),
            Span::raw(" Done"),
        ],
        Focus::Table => vec![
            Span::styled("↑/↓", key_style),
            Span::raw(" Navigate  "),
            Span::styled("Enter", key_style),
            Span::raw(" Weather  "),
            Span::styled("/", key_style),
            Span::raw(" Search  "),
            Span::styled("1-3", key_style),
            Span::raw(" Sort  "),
            Span::styled("n/c/t", key_style),
            Span::raw(" Filter  "),
            Span::styled("?", key_style),
            Span::raw(" Help  "),
            Span::styled("q", key_style),
            Span::raw(" Quit"),
        ],
    };

    let paragraph =
        Paragraph::new(Line::from(help_spans)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{City, Coordinates, FetchError};
    use crate::route::Route;
    use crate::store::PageResponse;
    use crate::tasks::TaskMessage;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;

    fn city(id: u64, name: &str, country: &str, timezone: &str) -> City {
        City {
            id,
            name: Some(name.to_string()),
            ascii_name: Some(name.to_string()),
            country: Some(country.to_string()),
            timezone: Some(timezone.to_string()),
            coordinates: Coordinates::default(),
            population: None,
        }
    }

    /// Helper to create an app whose first page has been answered
    fn create_test_app(result: Result<Vec<City>, FetchError>) -> App {
        let now = Instant::now();
        let mut app = App::new(Route::Cities, now);
        let epoch = app.store().epoch();
        app.tick(now);
        app.apply(TaskMessage::CitiesLoaded(PageResponse { epoch, result }));
        app
    }

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    #[test]
    fn test_render_rows_and_end_sentinel() {
        let app = create_test_app(Ok(vec![
            city(1, "Paris", "France", "Europe/Paris"),
            city(2, "London", "United Kingdom", "Europe/London"),
        ]));

        let content = draw(&app);
        assert!(content.contains("Paris"));
        assert!(content.contains("United Kingdom"));
        assert!(content.contains("Europe/London"));
        assert!(content.contains("No more cities to load"));
    }

    #[test]
    fn test_loading_screen_before_first_page() {
        let app = App::new(Route::Cities, Instant::now());
        let content = draw(&app);
        assert!(content.contains("Loading cities"));
    }

    #[test]
    fn test_error_screen_when_nothing_loaded() {
        let app = create_test_app(Err(FetchError::Status(500)));
        let content = draw(&app);
        assert!(content.contains("Couldn't load cities"));
        assert!(content.contains("r retry"));
    }

    #[test]
    fn test_later_page_error_keeps_rows_visible() {
        let page: Vec<City> = (0..20)
            .map(|id| city(id, &format!("Town {:02}", id), "Testland", "UTC"))
            .collect();
        let mut app = create_test_app(Ok(page));
        press(&mut app, KeyCode::End);
        let epoch = app.store().epoch();
        app.tick(Instant::now());
        app.apply(TaskMessage::CitiesLoaded(PageResponse {
            epoch,
            result: Err(FetchError::Status(503)),
        }));

        let content = draw(&app);
        assert!(content.contains("Town 19"));
        assert!(content.contains("(r to retry)"));
        assert!(!content.contains("Couldn't load cities"));
    }

    #[test]
    fn test_sort_indicator_follows_direction() {
        let mut app = create_test_app(Ok(vec![city(1, "Paris", "France", "Europe/Paris")]));

        press(&mut app, KeyCode::Char('2'));
        assert!(draw(&app).contains("Country ▲"));

        press(&mut app, KeyCode::Char('2'));
        assert!(draw(&app).contains("Country ▼"));
    }

    #[test]
    fn test_suggestions_render_while_searching() {
        let mut app = create_test_app(Ok(vec![
            city(1, "Paris", "France", "Europe/Paris"),
            city(2, "Parma", "Italy", "Europe/Rome"),
        ]));
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('a'));

        let content = draw(&app);
        assert!(content.contains(" Parma "));
        assert!(content.contains("Italy"));
    }

    #[test]
    fn test_scroll_start_keeps_selection_visible() {
        assert_eq!(scroll_start(0, 10), 0);
        assert_eq!(scroll_start(9, 10), 0);
        assert_eq!(scroll_start(10, 10), 1);
        assert_eq!(scroll_start(25, 10), 16);
        assert_eq!(scroll_start(3, 0), 0);
    }

    #[test]
    fn test_pad_truncates_long_values() {
        assert_eq!(pad("Paris", 8), "Paris   ");
        assert_eq!(pad("Saint-Petersburg", 8).chars().count(), 8);
    }
}
