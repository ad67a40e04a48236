//! Application state management for Citycast
//!
//! This module contains the main application state: keyboard handling for
//! the city list and weather screens, the debounced search input, and the
//! hand-off of network work to the event loop as `Effect`s. Nothing here
//! performs I/O, so every transition can be driven from tests with plain key
//! events and instants.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::data::City;
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::detail::{WeatherDetail, WeatherRequest};
use crate::query::{self, CityField, QueryState, Row, RowKey};
use crate::route::Route;
use crate::store::{CityStore, PageRequest};
use crate::tasks::TaskMessage;

/// Distance from the last displayed row at which the next page is requested
pub const SCROLL_THRESHOLD: usize = 3;

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Table of cities with search, sort and filters
    CityList,
    /// Current weather and forecast for the named city
    WeatherDetail(String),
}

/// Which part of the city list receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Search,
    Filter(CityField),
}

/// Network work requested by the app, performed by the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadPage(PageRequest),
    LoadWeather(WeatherRequest),
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Input focus on the list screen
    pub focus: Focus,
    /// Live contents of the search box
    pub search_input: String,
    /// Highlighted autocomplete suggestion, if any
    pub suggestion_index: Option<usize>,
    /// Index of the selected row among the displayed rows
    pub selected_index: usize,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    store: CityStore,
    query: QueryState,
    detail: WeatherDetail,
    search_debounce: Debouncer<String>,
    effects: Vec<Effect>,
}

impl App {
    /// Creates the app on `initial_route` and queues the first page of cities
    pub fn new(initial_route: Route, now: Instant) -> Self {
        let mut app = Self {
            state: AppState::CityList,
            focus: Focus::Table,
            search_input: String::new(),
            suggestion_index: None,
            selected_index: 0,
            should_quit: false,
            show_help: false,
            store: CityStore::new(),
            query: QueryState::default(),
            detail: WeatherDetail::new(),
            search_debounce: Debouncer::new(SEARCH_DEBOUNCE),
            effects: Vec::new(),
        };

        let first_page = app.store.reset("");
        app.effects.push(Effect::LoadPage(first_page));

        if let Route::Weather(city_name) = initial_route {
            app.open_detail(city_name, now);
        }
        app
    }

    /// Path of the current screen
    pub fn route(&self) -> Route {
        match &self.state {
            AppState::CityList => Route::Cities,
            AppState::WeatherDetail(city_name) => Route::Weather(city_name.clone()),
        }
    }

    pub fn store(&self) -> &CityStore {
        &self.store
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn detail(&self) -> &WeatherDetail {
        &self.detail
    }

    /// Rows currently displayed in the table (sorted, then filtered)
    pub fn rows(&self) -> Vec<Row<'_>> {
        query::derive_rows(self.store.records(), &self.query)
    }

    /// Autocomplete entries; only shown while the search box has focus
    pub fn suggestions(&self) -> Vec<&City> {
        if self.focus != Focus::Search {
            return Vec::new();
        }
        query::suggestions(self.store.records(), &self.search_input)
    }

    pub fn selected_city(&self) -> Option<&City> {
        self.rows().get(self.selected_index).map(|row| row.city)
    }

    fn selected_key(&self) -> Option<RowKey> {
        self.rows().get(self.selected_index).map(Row::key)
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// City list (table focus):
    /// - `/`: Focus the search box
    /// - `Up`/`k`, `Down`/`j`, `g`, `G`: Move the selection
    /// - `Enter`: Open weather for the selected city
    /// - `1`/`2`/`3`: Sort by City/Country/Timezone (again to reverse)
    /// - `n`/`c`/`t`: Edit the City/Country/Timezone filter
    /// - `x`: Clear all filters
    /// - `r`: Reload the list for the current search
    /// - `q`: Quit
    ///
    /// Weather detail:
    /// - `Esc`/`b`: Back to the list
    /// - `r`: Reload the weather
    pub fn handle_key(&mut self, key_event: KeyEvent, now: Instant) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match self.state {
            AppState::CityList => match self.focus {
                Focus::Table => self.handle_table_key(key_event, now),
                Focus::Search => self.handle_search_key(key_event, now),
                Focus::Filter(field) => self.handle_filter_key(field, key_event),
            },
            AppState::WeatherDetail(_) => self.handle_detail_key(key_event, now),
        }
    }

    fn handle_table_key(&mut self, key_event: KeyEvent, now: Instant) {
        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_previous();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                self.load_more_if_near_end();
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.selected_index = 0;
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.selected_index = self.rows().len().saturating_sub(1);
                self.load_more_if_near_end();
            }
            KeyCode::Enter => {
                self.open_selected(now);
            }
            KeyCode::Char('/') => {
                self.focus = Focus::Search;
                self.suggestion_index = None;
            }
            KeyCode::Char('1') => self.sort_by(CityField::Name),
            KeyCode::Char('2') => self.sort_by(CityField::Country),
            KeyCode::Char('3') => self.sort_by(CityField::Timezone),
            KeyCode::Char('n') => self.focus = Focus::Filter(CityField::Name),
            KeyCode::Char('c') => self.focus = Focus::Filter(CityField::Country),
            KeyCode::Char('t') => self.focus = Focus::Filter(CityField::Timezone),
            KeyCode::Char('x') => {
                let key = self.selected_key();
                self.query.filters = Default::default();
                self.reselect(key);
            }
            KeyCode::Char('r') => {
                self.reload();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key_event: KeyEvent, now: Instant) {
        match key_event.code {
            KeyCode::Esc | KeyCode::Tab => {
                self.focus = Focus::Table;
                self.suggestion_index = None;
            }
            KeyCode::Enter => match self.suggestion_index {
                Some(index) => self.accept_suggestion(index),
                None => {
                    // Commit without waiting out the quiet period
                    self.search_debounce.cancel();
                    let text = self.search_input.clone();
                    self.commit_search(text);
                    self.focus = Focus::Table;
                }
            },
            KeyCode::Down => {
                let count = self.suggestions().len();
                self.suggestion_index = match self.suggestion_index {
                    _ if count == 0 => None,
                    None => Some(0),
                    Some(index) => Some((index + 1).min(count - 1)),
                };
            }
            KeyCode::Up => {
                self.suggestion_index = match self.suggestion_index {
                    Some(0) | None => None,
                    Some(index) => Some(index - 1),
                };
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.input_changed(now);
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.input_changed(now);
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, field: CityField, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => {
                self.focus = Focus::Table;
            }
            KeyCode::Backspace => {
                let key = self.selected_key();
                self.query.filters.get_mut(field).pop();
                self.reselect(key);
            }
            KeyCode::Char(c) => {
                let key = self.selected_key();
                self.query.filters.get_mut(field).push(c);
                self.reselect(key);
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key_event: KeyEvent, now: Instant) {
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace | KeyCode::Left => {
                self.close_detail();
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                let city_name = self.detail.city_name().to_string();
                self.open_detail(city_name, now);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn input_changed(&mut self, now: Instant) {
        self.suggestion_index = None;
        self.search_debounce.schedule(self.search_input.clone(), now);
    }

    /// Puts the suggestion's ASCII name in the search box and searches for it at once
    fn accept_suggestion(&mut self, index: usize) {
        let Some(name) = self
            .suggestions()
            .get(index)
            .map(|city| city.ascii_name().to_string())
        else {
            return;
        };
        self.search_debounce.cancel();
        self.search_input = name.clone();
        self.suggestion_index = None;
        self.focus = Focus::Table;
        self.commit_search(name);
    }

    fn commit_search(&mut self, text: String) {
        info!(text = %text, "Search committed");
        let request = self.store.reset(text);
        self.selected_index = 0;
        self.effects.push(Effect::LoadPage(request));
    }

    /// Reloads the first page for the current search term
    pub fn reload(&mut self) {
        let text = self.store.search_text().to_string();
        self.commit_search(text);
    }

    fn sort_by(&mut self, field: CityField) {
        let key = self.selected_key();
        self.query.request_sort(field);
        self.reselect(key);
    }

    /// Moves the selection back onto `key` after the displayed rows changed,
    /// or clamps it if that row is no longer displayed
    fn reselect(&mut self, key: Option<RowKey>) {
        let index = {
            let rows = self.rows();
            key.and_then(|key| rows.iter().position(|row| row.key() == key))
                .unwrap_or_else(|| self.selected_index.min(rows.len().saturating_sub(1)))
        };
        self.selected_index = index;
    }

    fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    fn select_next(&mut self) {
        let count = self.rows().len();
        if self.selected_index + 1 < count {
            self.selected_index += 1;
        }
    }

    fn open_selected(&mut self, now: Instant) {
        let Some(city_name) = self
            .selected_city()
            .map(|city| city.ascii_name().to_string())
        else {
            return;
        };
        if city_name.is_empty() {
            debug!("Selected city has no ASCII name");
            return;
        }
        self.open_detail(city_name, now);
    }

    fn open_detail(&mut self, city_name: String, now: Instant) {
        self.detail.open(city_name.clone(), now);
        self.state = AppState::WeatherDetail(city_name);
    }

    fn close_detail(&mut self) {
        self.detail.close();
        self.state = AppState::CityList;
    }

    /// True when the selection is close enough to the end to want another page
    fn near_end(&self) -> bool {
        self.selected_index + SCROLL_THRESHOLD >= self.rows().len()
    }

    /// Queues the next page after a downward move lands near the end of the
    /// table. A failed page blocks this until `r` reloads.
    fn load_more_if_near_end(&mut self) {
        if self.store.error().is_some() || !self.near_end() {
            return;
        }
        if let Some(request) = self.store.begin_load() {
            debug!(offset = request.offset, "Requesting next page");
            self.effects.push(Effect::LoadPage(request));
        }
    }

    /// Advances timers and returns the network work now due.
    ///
    /// This commits a settled search and issues the weather fetch after the
    /// settle delay. It also hands over work queued by key handling, such as
    /// the next page requested by scrolling.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        if let Some(text) = self.search_debounce.poll(now) {
            if text != self.store.search_text() {
                self.commit_search(text);
            }
        }

        if let Some(request) = self.detail.tick(now) {
            self.effects.push(Effect::LoadWeather(request));
        }

        std::mem::take(&mut self.effects)
    }

    /// Applies a finished background fetch
    pub fn apply(&mut self, message: TaskMessage) {
        match message {
            TaskMessage::CitiesLoaded(response) => {
                let key = self.selected_key();
                if self.store.apply(response) {
                    self.reselect(key);
                }
            }
            TaskMessage::WeatherLoaded(response) => {
                self.detail.apply(response);
            }
        }
    }
}
