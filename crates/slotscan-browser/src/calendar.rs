//! Calendar readiness and month pagination

use crate::driver::PageDriver;
use slotscan_core::{Error, Result, ScanConfig};
use tracing::{debug, info};

/// Marker element the booking page inserts once the calendar widget mounts.
pub const CALENDAR_MARKER: &str = r#"[data-testid="calendar"]"#;

/// Month-forward pagination control.
pub const NEXT_MONTH_CONTROL: &str = r#"button[aria-label="Go to next month"]"#;

/// Outcome of a month-forward attempt. Absence of the control is the
/// expected end of pagination, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthAdvance {
    Advanced,
    End,
}

/// Waits for the calendar widget and advances it one month at a time.
pub struct CalendarNavigator<'a, D: PageDriver> {
    driver: &'a D,
    config: &'a ScanConfig,
}

impl<'a, D: PageDriver> CalendarNavigator<'a, D> {
    pub fn new(driver: &'a D, config: &'a ScanConfig) -> Self {
        Self { driver, config }
    }

    /// Block until the calendar marker is present, then apply the load
    /// settle delay. The page finishes rendering in several asynchronous
    /// phases after the marker appears, and only the first phase is
    /// observable through the DOM.
    pub fn wait_ready(&self) -> Result<()> {
        let timeout = self.config.calendar_timeout();
        self.driver
            .wait_for(CALENDAR_MARKER, timeout)
            .map_err(|_| Error::CalendarLoadTimeout(timeout))?;
        self.driver.settle(self.config.load_settle());
        Ok(())
    }

    /// Shorter readiness wait used after revisit reloads and history-back
    /// returns, once the page is known to serve the calendar.
    pub fn wait_ready_again(&self) -> Result<()> {
        let timeout = self.config.revisit_timeout();
        self.driver
            .wait_for(CALENDAR_MARKER, timeout)
            .map_err(|_| Error::CalendarLoadTimeout(timeout))?;
        self.driver.settle(self.config.action_settle());
        Ok(())
    }

    /// Advance the calendar one month. Best-effort: a missing or
    /// non-interactable control ends pagination silently.
    pub fn go_to_next_month(&self) -> MonthAdvance {
        if self
            .driver
            .wait_for(NEXT_MONTH_CONTROL, self.config.next_month_timeout())
            .is_err()
        {
            debug!("Next month control not present, pagination ends");
            return MonthAdvance::End;
        }

        match self.driver.click(NEXT_MONTH_CONTROL) {
            Ok(true) => {
                self.driver.settle(self.config.action_settle());
                info!("Advanced to next month");
                MonthAdvance::Advanced
            }
            Ok(false) => {
                debug!("Next month control disappeared before click");
                MonthAdvance::End
            }
            Err(e) => {
                debug!("Next month click failed: {}", e);
                MonthAdvance::End
            }
        }
    }
}
