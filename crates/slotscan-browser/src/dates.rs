//! Bookable-date enumeration

use crate::driver::PageDriver;
use slotscan_core::Result;
use tracing::debug;

/// Calendar-day controls the booking page marks as bookable.
pub const BOOKABLE_CONTROL: &str = "button.booking-kit_button-bookable_80ba95eb";

/// Substring of the accessible label that distinguishes bookable cells
/// from past, disabled and fully booked ones, which lack it.
pub const AVAILABILITY_MARKER: &str = "Times available";

/// Separator between the date prefix and the rest of the accessible label.
pub const LABEL_SEPARATOR: &str = " - ";

/// Date prefix of a bookable control's accessible label, e.g.
/// "Monday, June 10" out of "Monday, June 10 - Times available".
pub fn date_label(accessible_label: &str) -> &str {
    match accessible_label.split_once(LABEL_SEPARATOR) {
        Some((date, _)) => date,
        None => accessible_label,
    }
}

/// Read-only scan of the current month view.
pub struct DateEnumerator<'a, D: PageDriver> {
    driver: &'a D,
}

impl<'a, D: PageDriver> DateEnumerator<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// List the date labels of every bookable control in the current view,
    /// in DOM traversal order (left-to-right, top-to-bottom as rendered).
    /// No control is activated.
    ///
    /// Traversal order is how the page renders the grid, not guaranteed
    /// chronological; callers must not assume sorted dates.
    pub fn enumerate(&self) -> Result<Vec<String>> {
        let labels = self.driver.attr_values(BOOKABLE_CONTROL, "aria-label")?;
        let dates: Vec<String> = labels
            .iter()
            .filter(|label| label.contains(AVAILABILITY_MARKER))
            .map(|label| date_label(label).to_string())
            .collect();
        debug!("Found {} bookable dates in current view", dates.len());
        Ok(dates)
    }
}
