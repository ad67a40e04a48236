//! Weather detail screen UI
//!
//! Renders current conditions and the five-day summary for one city, with an
//! icon and accent colour chosen from the primary condition.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::data::{ConditionKind, ForecastEntry, WeatherSnapshot};
use crate::detail::{five_day_summary, CityWeather, DetailState, WeatherDetail};
use crate::ui::status;

mod colors {
    use ratatui::style::Color;

    /// Section headers
    pub const HEADER: Color = Color::Cyan;
    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Secondary/dimmed text
    pub const SECONDARY: Color = Color::Gray;
    pub const WARM: Color = Color::LightRed;
    pub const COOL: Color = Color::LightBlue;
}

/// Glyph for a condition
pub fn condition_icon(kind: ConditionKind) -> &'static str {
    match kind {
        ConditionKind::Clear => "\u{2600}",         // ☀
        ConditionKind::Rain => "\u{1F327}",         // 🌧
        ConditionKind::Clouds => "\u{2601}",        // ☁
        ConditionKind::Snow => "\u{2744}",          // ❄
        ConditionKind::Thunderstorm => "\u{26C8}",  // ⛈
        ConditionKind::Fog => "\u{1F32B}",          // 🌫
    }
}

/// Accent colour for a condition; fog has no accent of its own and uses the clear one
pub fn accent_color(kind: ConditionKind) -> Color {
    match kind {
        ConditionKind::Clear | ConditionKind::Fog => Color::Yellow,
        ConditionKind::Rain => Color::Blue,
        ConditionKind::Clouds => Color::Gray,
        ConditionKind::Snow => Color::White,
        ConditionKind::Thunderstorm => Color::Magenta,
    }
}

/// 16-point compass label for a wind bearing in degrees
pub fn compass_direction(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let index = ((degrees.rem_euclid(360.0) / 22.5).round() as usize) % POINTS.len();
    POINTS[index]
}

/// Upper-cases the first letter ("light rain" → "Light rain")
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders the weather detail screen for whatever state the load is in
pub fn render(frame: &mut Frame, detail: &WeatherDetail) {
    match detail.state() {
        DetailState::Loaded(weather) => render_weather(frame, detail.city_name(), weather),
        DetailState::Errored(message) => status::render_error(
            frame,
            &format!("Couldn't load weather for {}", detail.city_name()),
            message,
            "Esc/b back  ·  r retry  ·  q quit",
        ),
        DetailState::Closed | DetailState::Pending { .. } | DetailState::Loading => {
            status::render_loading(frame, &format!("Loading weather for {}…", detail.city_name()))
        }
    }
}

fn render_weather(frame: &mut Frame, city_name: &str, weather: &CityWeather) {
    let area = frame.area();
    let kind = weather.current.condition.kind();
    let accent = accent_color(kind);

    let title = match &weather.current.country {
        Some(country) => format!(" {} {}, {} ", condition_icon(kind), city_name, country),
        None => format!(" {} {} ", condition_icon(kind), city_name),
    };
    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(Span::styled(
            title,
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Current conditions
            Constraint::Min(3),    // Five-day summary
            Constraint::Length(1), // Help text
        ])
        .split(inner_area);

    frame.render_widget(
        Paragraph::new(build_current_lines(&weather.current)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(build_forecast_lines(&five_day_summary(&weather.forecast))),
        chunks[1],
    );
    render_help_text(frame, chunks[2]);
}

fn build_current_lines(current: &WeatherSnapshot) -> Vec<Line<'static>> {
    let kind = current.condition.kind();
    let observed = current.observed_at.with_timezone(&Local);

    vec![
        Line::from(Span::styled(
            observed.format("%A, %B %-d  %H:%M").to_string(),
            Style::default().fg(colors::SECONDARY),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw(format!("{}  ", condition_icon(kind))),
            Span::styled(
                format!("{:.0}°C", current.temperature.round()),
                Style::default()
                    .fg(accent_color(kind))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                capitalize(&current.condition.description),
                Style::default().fg(colors::PRIMARY),
            ),
        ]),
        Line::from(vec![
            Span::styled("Feels like ", Style::default().fg(colors::SECONDARY)),
            Span::raw(format!("{:.0}°C", current.feels_like.round())),
            Span::styled("   High ", Style::default().fg(colors::SECONDARY)),
            Span::styled(
                format!("{:.0}°", current.temp_max.round()),
                Style::default().fg(colors::WARM),
            ),
            Span::styled("  Low ", Style::default().fg(colors::SECONDARY)),
            Span::styled(
                format!("{:.0}°", current.temp_min.round()),
                Style::default().fg(colors::COOL),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Humidity  ", Style::default().fg(colors::SECONDARY)),
            Span::raw(format!("{}%", current.humidity)),
            Span::styled("     Clouds  ", Style::default().fg(colors::SECONDARY)),
            Span::raw(format!("{}%", current.cloud_cover)),
        ]),
        Line::from(vec![
            Span::styled("Wind      ", Style::default().fg(colors::SECONDARY)),
            Span::raw(format!(
                "{:.1} m/s {}",
                current.wind_speed,
                compass_direction(current.wind_direction)
            )),
        ]),
        Line::from(vec![
            Span::styled("Pressure  ", Style::default().fg(colors::SECONDARY)),
            Span::raw(format!("{:.0} hPa", current.pressure)),
        ]),
    ]
}

fn build_forecast_lines(days: &[&ForecastEntry]) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "5-DAY FORECAST",
        Style::default()
            .fg(colors::HEADER)
            .add_modifier(Modifier::BOLD),
    ))];

    if days.is_empty() {
        lines.push(Line::from(Span::styled(
            "Forecast unavailable",
            Style::default().fg(colors::SECONDARY),
        )));
        return lines;
    }

    for entry in days {
        let kind = entry.condition.kind();
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<5}", entry.time.with_timezone(&Local).format("%a").to_string()),
                Style::default().fg(colors::PRIMARY),
            ),
            Span::raw(format!("{}  ", condition_icon(kind))),
            Span::styled(
                format!("{:>4.0}°", entry.temp_max.round()),
                Style::default().fg(colors::WARM),
            ),
            Span::raw(" / "),
            Span::styled(
                format!("{:>3.0}°", entry.temp_min.round()),
                Style::default().fg(colors::COOL),
            ),
            Span::raw("  "),
            Span::styled(
                capitalize(&entry.condition.description),
                Style::default().fg(colors::SECONDARY),
            ),
        ]));
    }
    lines
}

fn render_help_text(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Yellow);
    let help = Line::from(vec![
        Span::styled("Esc/b", key_style),
        Span::raw(" Back  "),
        Span::styled("r", key_style),
        Span::raw(" Reload  "),
        Span::styled("?", key_style),
        Span::raw(" Help  "),
        Span::styled("q", key_style),
        Span::raw(" Quit"),
    ]);
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
