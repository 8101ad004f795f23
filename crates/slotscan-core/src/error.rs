//! Unified error types for slotscan

use std::time::Duration;
use thiserror::Error;

/// Unified error type for all slotscan operations.
///
/// Only `Provisioning`, `Navigation` and `CalendarLoadTimeout` invalidate a
/// whole report; everything a single date can suffer is modeled as data
/// (`DateOutcome` in the browser crate), not as an error escaping the run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser provisioning failed: {0}")]
    Provisioning(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Calendar did not appear within {0:?}")]
    CalendarLoadTimeout(Duration),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using Error
pub type Result<T> = std::result::Result<T, Error>;
