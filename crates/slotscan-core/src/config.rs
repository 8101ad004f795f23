//! Scrape configuration
//!
//! Loaded from an optional TOML file, with CLI flags layered on top by the
//! binary. Timeouts bound every wait; settle delays cover the rendering
//! phases the page does not signal through the DOM.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::report::RetentionPolicy;
use crate::Result;

/// How a date's slot panel is revealed for counting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStrategy {
    /// Reload the month URL before every date and relocate the control
    /// fresh. Survives single-page-app navigations that replace the whole
    /// DOM after a date is activated.
    #[default]
    Revisit,
    /// Activate the control in the current view and return to the
    /// calendar with history-back.
    InPlace,
}

/// Tunables for one availability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub strategy: SlotStrategy,

    #[serde(default)]
    pub retention: RetentionPolicy,

    /// Seconds to wait for the calendar marker on the initial load.
    #[serde(default = "default_calendar_timeout_secs")]
    pub calendar_timeout_secs: u64,

    /// Seconds to wait for the marker on revisit reloads, once the page is
    /// known to serve the calendar at all.
    #[serde(default = "default_revisit_timeout_secs")]
    pub revisit_timeout_secs: u64,

    /// Seconds to wait for the next-month control before pagination ends.
    #[serde(default = "default_next_month_timeout_secs")]
    pub next_month_timeout_secs: u64,

    /// Settle delay after first calendar readiness, in milliseconds. The
    /// page keeps rendering in asynchronous phases after the marker shows.
    #[serde(default = "default_load_settle_ms")]
    pub load_settle_ms: u64,

    /// Settle delay after activating a date or month control, in
    /// milliseconds.
    #[serde(default = "default_action_settle_ms")]
    pub action_settle_ms: u64,
}

fn default_calendar_timeout_secs() -> u64 {
    15
}

fn default_revisit_timeout_secs() -> u64 {
    8
}

fn default_next_month_timeout_secs() -> u64 {
    5
}

fn default_load_settle_ms() -> u64 {
    3000
}

fn default_action_settle_ms() -> u64 {
    1500
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            strategy: SlotStrategy::default(),
            retention: RetentionPolicy::default(),
            calendar_timeout_secs: default_calendar_timeout_secs(),
            revisit_timeout_secs: default_revisit_timeout_secs(),
            next_month_timeout_secs: default_next_month_timeout_secs(),
            load_settle_ms: default_load_settle_ms(),
            action_settle_ms: default_action_settle_ms(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a TOML file, or use defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| crate::Error::Config(format!("failed to parse {}: {}", path.display(), e)))
        } else {
            Ok(Self::default())
        }
    }

    pub fn calendar_timeout(&self) -> Duration {
        Duration::from_secs(self.calendar_timeout_secs)
    }

    pub fn revisit_timeout(&self) -> Duration {
        Duration::from_secs(self.revisit_timeout_secs)
    }

    pub fn next_month_timeout(&self) -> Duration {
        Duration::from_secs(self.next_month_timeout_secs)
    }

    pub fn load_settle(&self) -> Duration {
        Duration::from_millis(self.load_settle_ms)
    }

    pub fn action_settle(&self) -> Duration {
        Duration::from_millis(self.action_settle_ms)
    }
}
