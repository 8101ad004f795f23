//! # slotscan-core
//!
//! Core types for the slotscan booking-availability checker: the report
//! shape returned to callers, the unified error enum, and the scrape
//! configuration shared by the browser core and the binaries.

mod config;
mod error;
mod report;

pub use config::{ScanConfig, SlotStrategy};
pub use error::{Error, Result};
pub use report::{AvailabilityReport, DayResult, RetentionPolicy};
