//! Per-date slot revealing and counting

use crate::calendar::CalendarNavigator;
use crate::dates::{AVAILABILITY_MARKER, BOOKABLE_CONTROL};
use crate::driver::PageDriver;
use regex::Regex;
use slotscan_core::{ScanConfig, SlotStrategy};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Structural selectors for slot buttons, tried first. The page varies its
/// slot-list DOM across layout variants, hence the union.
pub const SLOT_CONTROLS: &str = concat!(
    r#"button[data-container="time-button"], "#,
    r#"button[data-testid="time"], "#,
    r#"[data-component="spot-list"] button, "#,
    r#"[data-container="spots"] button"#
);

/// Outcome of counting one date. Matched exhaustively by the caller;
/// neither failure variant aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOutcome {
    Counted(usize),
    /// The date control could not be relocated by label match.
    NotRelocated,
    /// Activation or counting failed.
    Failed(String),
}

fn clock_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{1,2}:\d{2}").unwrap())
}

/// Heuristic used when the structural lookup finds nothing: any control
/// whose accessible label or text carries an AM/PM marker or a clock time.
pub fn is_time_like(label: &str) -> bool {
    label.contains("AM") || label.contains("PM") || clock_token().is_match(label)
}

/// Reveals one date's slot panel and counts it.
pub struct SlotCounter<'a, D: PageDriver> {
    driver: &'a D,
    config: &'a ScanConfig,
}

impl<'a, D: PageDriver> SlotCounter<'a, D> {
    pub fn new(driver: &'a D, config: &'a ScanConfig) -> Self {
        Self { driver, config }
    }

    /// Reveal and count the slots for one date label. `base_url` is the
    /// URL of the month view the label was discovered in.
    pub fn count_for(&self, date: &str, base_url: &str) -> DateOutcome {
        match self.config.strategy {
            SlotStrategy::Revisit => self.count_revisit(date, base_url),
            SlotStrategy::InPlace => self.count_in_place(date),
        }
    }

    /// Reload the month URL and relocate the control fresh. Survives
    /// single-page-app navigations that replace the whole DOM after a
    /// date is activated.
    fn count_revisit(&self, date: &str, base_url: &str) -> DateOutcome {
        let navigator = CalendarNavigator::new(self.driver, self.config);

        if let Err(e) = self.driver.goto(base_url) {
            return DateOutcome::Failed(e.to_string());
        }
        if let Err(e) = navigator.wait_ready_again() {
            return DateOutcome::Failed(e.to_string());
        }

        match self.activate(date) {
            Ok(true) => self.count_revealed(),
            Ok(false) => DateOutcome::NotRelocated,
            Err(reason) => DateOutcome::Failed(reason),
        }
    }

    /// Activate the control in the current view, count, then return to
    /// the calendar with history-back.
    fn count_in_place(&self, date: &str) -> DateOutcome {
        let outcome = match self.activate(date) {
            Ok(true) => self.count_revealed(),
            Ok(false) => return DateOutcome::NotRelocated,
            Err(reason) => return DateOutcome::Failed(reason),
        };

        if let Err(e) = self.driver.back() {
            warn!("History back failed after counting {}: {}", date, e);
        }
        let navigator = CalendarNavigator::new(self.driver, self.config);
        if let Err(e) = navigator.wait_ready_again() {
            // The next date's lookup will report NotRelocated if the
            // calendar really is gone.
            warn!("Calendar not ready after returning from {}: {}", date, e);
        }

        outcome
    }

    /// Relocate the control by label match and click it. The needle pair
    /// keeps a prefix-ambiguous date (e.g. "Mon 1" in "Mon 10") from
    /// matching a non-bookable cell: both the date text and the
    /// availability marker must appear in the label.
    fn activate(&self, date: &str) -> std::result::Result<bool, String> {
        let clicked = self
            .driver
            .click_where_attr(BOOKABLE_CONTROL, "aria-label", &[date, AVAILABILITY_MARKER])
            .map_err(|e| e.to_string())?;
        if clicked {
            self.driver.settle(self.config.action_settle());
        }
        Ok(clicked)
    }

    fn count_revealed(&self) -> DateOutcome {
        match self.driver.count(SLOT_CONTROLS) {
            Ok(0) => {}
            Ok(n) => return DateOutcome::Counted(n),
            Err(e) => return DateOutcome::Failed(e.to_string()),
        }

        // Structural lookup found nothing; fall back to the time-token
        // scan over all buttons.
        match self.driver.button_labels() {
            Ok(labels) => {
                let n = labels.iter().filter(|label| is_time_like(label)).count();
                debug!("Structural slot lookup empty, heuristic counted {}", n);
                DateOutcome::Counted(n)
            }
            Err(e) => DateOutcome::Failed(e.to_string()),
        }
    }
}
