//! Top-level availability check: one browser session, at most two month
//! views, one report.

use crate::calendar::{CalendarNavigator, MonthAdvance};
use crate::dates::DateEnumerator;
use crate::driver::{PageDriver, SessionProvider};
use crate::slots::{DateOutcome, SlotCounter};
use slotscan_core::{AvailabilityReport, DayResult, Result, ScanConfig, SlotStrategy};
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

/// Run one availability check end to end.
///
/// The session is disposed exactly once on every exit path — success,
/// recoverable failure, fatal failure, panic. A panic escaping the drive
/// is contained and surfaced as a failed report; the boundary never
/// propagates it.
pub fn run_check<P: SessionProvider>(
    provider: &P,
    url: &str,
    config: &ScanConfig,
) -> AvailabilityReport {
    let session = match provider.acquire() {
        Ok(session) => session,
        Err(e) => {
            warn!("Provisioning failed: {}", e);
            return AvailabilityReport::failed(e.to_string());
        }
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| drive(&session, url, config)));

    if let Err(e) = session.dispose() {
        warn!("Browser disposal failed: {}", e);
    }

    match outcome {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            warn!("Availability check failed: {}", e);
            AvailabilityReport::failed(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload);
            warn!("Availability check panicked: {}", message);
            AvailabilityReport::failed(message)
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "availability check panicked".to_string()
    }
}

fn drive<D: PageDriver>(driver: &D, url: &str, config: &ScanConfig) -> Result<AvailabilityReport> {
    driver.goto(url)?;

    let navigator = CalendarNavigator::new(driver, config);
    navigator.wait_ready()?;

    let mut days = Vec::new();
    process_view(driver, config, url, &mut days);

    // At most one month beyond the initial view, however far the calendar
    // itself paginates.
    if restore_calendar_view(driver, &navigator, config, url)
        && navigator.go_to_next_month() == MonthAdvance::Advanced
    {
        // The month switch may rewrite the URL; revisit reloads must use
        // the rewritten one to land back on the same view.
        let month_url = driver.current_url();
        process_view(driver, config, &month_url, &mut days);
    }

    info!("Processed {} dates", days.len());
    Ok(AvailabilityReport::from_days(days, config.retention))
}

/// Put the page back in calendar view before looking for the pagination
/// control. Counting leaves the last date's slot panel showing, and under
/// the revisit strategy that panel may be an SPA navigation that replaced
/// the calendar DOM entirely; reload the month URL and re-confirm
/// readiness first. The in-place strategy already returned via
/// history-back. Failure here ends pagination, it never fails the report.
fn restore_calendar_view<D: PageDriver>(
    driver: &D,
    navigator: &CalendarNavigator<'_, D>,
    config: &ScanConfig,
    url: &str,
) -> bool {
    if config.strategy != SlotStrategy::Revisit {
        return true;
    }
    if let Err(e) = driver.goto(url) {
        warn!("Could not reload calendar before pagination: {}", e);
        return false;
    }
    if let Err(e) = navigator.wait_ready_again() {
        warn!("Calendar not ready before pagination: {}", e);
        return false;
    }
    true
}

/// Enumerate the current view and count slots per date, serially. Each
/// per-date failure degrades to zero slots; only the enumeration scan
/// itself failing skips the whole view.
fn process_view<D: PageDriver>(
    driver: &D,
    config: &ScanConfig,
    base_url: &str,
    days: &mut Vec<DayResult>,
) {
    let dates = match DateEnumerator::new(driver).enumerate() {
        Ok(dates) => dates,
        Err(e) => {
            warn!("Date enumeration failed, skipping view: {}", e);
            return;
        }
    };

    let counter = SlotCounter::new(driver, config);
    for date in dates {
        let slots = match counter.count_for(&date, base_url) {
            DateOutcome::Counted(n) => {
                info!("{}: {} slots", date, n);
                n
            }
            DateOutcome::NotRelocated => {
                warn!("Could not relocate control for {}, recording 0 slots", date);
                0
            }
            DateOutcome::Failed(reason) => {
                warn!("Slot count failed for {} ({}), recording 0 slots", date, reason);
                0
            }
        };
        days.push(DayResult { date, slots });
    }
}
