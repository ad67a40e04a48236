//! UI rendering module for Citycast
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod city_list;
pub mod help_overlay;
pub mod status;
pub mod weather_detail;

use ratatui::Frame;

use crate::app::{App, AppState};

/// Renders the screen for the current application state
pub fn render(frame: &mut Frame, app: &App) {
    match &app.state {
        AppState::CityList => city_list::render(frame, app),
        AppState::WeatherDetail(_) => weather_detail::render(frame, app.detail()),
    }

    if app.show_help {
        help_overlay::render(frame);
    }
}
