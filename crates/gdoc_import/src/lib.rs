//! Command-line front end: configuration, progress output and wiring of the
//! import engine.

pub mod app;
pub mod config;
pub mod progress;

pub use app::import_document;
pub use config::{ConfigError, FetchConfig, ImportConfig, DEFAULT_TOKEN_ENV};
pub use progress::ConsoleProgress;
