//! Citycast - browse world cities and check their weather
//!
//! A terminal UI application that lists cities from a public places catalog
//! and shows current conditions and a 5-day forecast for any of them.

use std::io;
use std::panic;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use citycast::app::{App, Effect};
use citycast::cli::{Cli, StartupConfig};
use citycast::data::{OpenWeatherClient, PlacesClient};
use citycast::logging;
use citycast::tasks::TaskRunner;
use citycast::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Starts file logging; the program keeps running without it if the log
/// directory is unavailable
fn init_logging(config: &StartupConfig) -> Option<WorkerGuard> {
    let dir = config.log_dir.clone().or_else(logging::default_log_dir)?;
    match logging::setup_logging(config.log_level, &dir) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {err}");
            None
        }
    }
}

fn dispatch(tasks: &TaskRunner, effect: Effect) {
    match effect {
        Effect::LoadPage(request) => tasks.spawn_page(request),
        Effect::LoadWeather(request) => tasks.spawn_weather(request),
    }
}

/// Main event loop: start due work, apply finished work, draw, read a key
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tasks: &mut TaskRunner,
) -> io::Result<()> {
    loop {
        for effect in app.tick(Instant::now()) {
            dispatch(tasks, effect);
        }
        while let Some(message) = tasks.try_recv() {
            app.apply(message);
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Instant::now());
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Validate before touching the terminal so errors print normally
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    let _log_guard = init_logging(&config);
    info!(route = %config.initial_route.to_path(), "Starting citycast");

    let places = match &config.places_url {
        Some(url) => PlacesClient::with_base_url(url.clone()),
        None => PlacesClient::new(),
    };
    let weather = match &config.weather_url {
        Some(url) => OpenWeatherClient::with_base_url(config.api_key.clone(), url.clone()),
        None => OpenWeatherClient::new(config.api_key.clone()),
    };
    let mut tasks = TaskRunner::new(places, weather);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.initial_route.clone(), Instant::now());
    let result = run(&mut terminal, &mut app, &mut tasks);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Err(err) = &result {
        warn!(error = %err, "Event loop ended with an error");
    }
    info!("Exiting citycast");
    result.map_err(Into::into)
}
