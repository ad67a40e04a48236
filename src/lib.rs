//! Citycast Library
//!
//! Exposes the application modules to the binary and to integration tests.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod debounce;
pub mod detail;
pub mod logging;
pub mod query;
pub mod route;
pub mod store;
pub mod tasks;
pub mod ui;
