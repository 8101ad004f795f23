//! End-to-end checks of the scraping flow against a scripted page double.
//!
//! The double plays the role of the booking page: two month views, a
//! next-month control, bookable-date labels and slot buttons, all driven
//! through the same `PageDriver` seam the Chrome session implements.

use slotscan_browser::calendar::{CALENDAR_MARKER, NEXT_MONTH_CONTROL};
use slotscan_browser::checker::run_check;
use slotscan_browser::dates::AVAILABILITY_MARKER;
use slotscan_browser::driver::{PageDriver, SessionProvider};
use slotscan_browser::slots::SLOT_CONTROLS;
use slotscan_core::{Error, Result, RetentionPolicy, ScanConfig, SlotStrategy};
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BASE_URL: &str = "https://calendly.com/acme/intro-call";
const NEXT_URL: &str = "https://calendly.com/acme/intro-call?month=2025-07";

#[derive(Clone)]
struct FakeDate {
    label: String,
    slots: usize,
    /// When false the control vanishes between enumeration and lookup.
    relocatable: bool,
}

fn date(label: &str, slots: usize) -> FakeDate {
    FakeDate {
        label: label.to_string(),
        slots,
        relocatable: true,
    }
}

fn vanishing(label: &str, slots: usize) -> FakeDate {
    FakeDate {
        label: label.to_string(),
        slots,
        relocatable: false,
    }
}

struct FakeState {
    view: usize,
    active: Option<FakeDate>,
}

struct FakeDriver {
    months: Vec<Vec<FakeDate>>,
    extra_labels: Vec<String>,
    has_next_month: bool,
    calendar_loads: bool,
    structural_slots: bool,
    panic_on_scan: bool,
    state: RefCell<FakeState>,
    disposals: Arc<AtomicUsize>,
}

impl FakeDriver {
    fn new(months: Vec<Vec<FakeDate>>) -> Self {
        Self {
            months,
            extra_labels: Vec::new(),
            has_next_month: false,
            calendar_loads: true,
            structural_slots: true,
            panic_on_scan: false,
            state: RefCell::new(FakeState {
                view: 0,
                active: None,
            }),
            disposals: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_next_month(mut self) -> Self {
        self.has_next_month = true;
        self
    }

    fn without_calendar(mut self) -> Self {
        self.calendar_loads = false;
        self
    }

    fn heuristic_only(mut self) -> Self {
        self.structural_slots = false;
        self
    }

    fn panicking(mut self) -> Self {
        self.panic_on_scan = true;
        self
    }

    fn with_extra_label(mut self, label: &str) -> Self {
        self.extra_labels.push(label.to_string());
        self
    }

    fn disposal_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.disposals)
    }

    fn full_label(date: &FakeDate) -> String {
        format!("{} - {}", date.label, AVAILABILITY_MARKER)
    }
}

impl PageDriver for FakeDriver {
    fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.view = if url == NEXT_URL { 1 } else { 0 };
        state.active = None;
        Ok(())
    }

    fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<()> {
        let state = self.state.borrow();
        // Activating a date is an SPA navigation: while the slot panel
        // shows, the calendar and its pagination control are gone.
        let in_calendar = state.active.is_none();
        match selector {
            CALENDAR_MARKER if self.calendar_loads && in_calendar => Ok(()),
            CALENDAR_MARKER => Err(Error::Browser("calendar marker never appeared".into())),
            NEXT_MONTH_CONTROL if self.has_next_month && state.view == 0 && in_calendar => Ok(()),
            NEXT_MONTH_CONTROL => Err(Error::Browser("next month control not found".into())),
            _ => Ok(()),
        }
    }

    fn attr_values(&self, _selector: &str, _attr: &str) -> Result<Vec<String>> {
        if self.panic_on_scan {
            panic!("dom snapshot corrupted");
        }
        let view = self.state.borrow().view;
        let mut labels: Vec<String> = self.months[view].iter().map(Self::full_label).collect();
        labels.extend(self.extra_labels.iter().cloned());
        Ok(labels)
    }

    fn click_where_attr(&self, _selector: &str, _attr: &str, needles: &[&str]) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        let view = state.view;
        for date in &self.months[view] {
            let label = Self::full_label(date);
            if needles.iter().all(|needle| label.contains(needle)) {
                if !date.relocatable {
                    continue;
                }
                state.active = Some(date.clone());
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn click(&self, selector: &str) -> Result<bool> {
        if selector == NEXT_MONTH_CONTROL {
            let mut state = self.state.borrow_mut();
            if self.has_next_month && state.view == 0 {
                state.view = 1;
                state.active = None;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn count(&self, selector: &str) -> Result<usize> {
        if selector != SLOT_CONTROLS || !self.structural_slots {
            return Ok(0);
        }
        Ok(self
            .state
            .borrow()
            .active
            .as_ref()
            .map(|date| date.slots)
            .unwrap_or(0))
    }

    fn button_labels(&self) -> Result<Vec<String>> {
        let mut labels = vec![
            "Go to next month".to_string(),
            "Cookie settings".to_string(),
        ];
        if let Some(active) = self.state.borrow().active.as_ref() {
            for hour in 0..active.slots {
                labels.push(format!("{}:00 PM", hour + 1));
            }
        }
        Ok(labels)
    }

    fn back(&self) -> Result<()> {
        self.state.borrow_mut().active = None;
        Ok(())
    }

    fn current_url(&self) -> String {
        match self.state.borrow().view {
            0 => BASE_URL.to_string(),
            _ => NEXT_URL.to_string(),
        }
    }

    fn settle(&self, _delay: Duration) {}

    fn dispose(self) -> Result<()> {
        self.disposals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeProvider {
    session: Mutex<Option<FakeDriver>>,
    acquires: Arc<AtomicUsize>,
}

impl FakeProvider {
    fn with(driver: FakeDriver) -> Self {
        Self {
            session: Mutex::new(Some(driver)),
            acquires: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing() -> Self {
        Self {
            session: Mutex::new(None),
            acquires: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SessionProvider for FakeProvider {
    type Session = FakeDriver;

    fn acquire(&self) -> Result<FakeDriver> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        self.session
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| Error::Provisioning("chrome executable not found".into()))
    }
}

fn config(strategy: SlotStrategy, retention: RetentionPolicy) -> ScanConfig {
    ScanConfig {
        strategy,
        retention,
        ..ScanConfig::default()
    }
}

#[test]
fn two_months_aggregate_in_discovery_order() {
    let driver = FakeDriver::new(vec![
        vec![date("Friday, June 13", 3), date("Monday, June 2", 2)],
        vec![date("Tuesday, July 1", 4)],
    ])
    .with_next_month();
    let disposals = driver.disposal_counter();
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::KeepAll),
    );

    assert!(report.success);
    assert_eq!(report.available_days, 3);
    assert_eq!(report.total_slots, 9);
    assert_eq!(
        report.total_slots,
        report.details.iter().map(|d| d.slots).sum::<usize>()
    );
    // Discovery order: DOM order within the view, current month first.
    // "Friday, June 13" precedes "Monday, June 2" because the page listed
    // it first, chronology notwithstanding.
    let dates: Vec<&str> = report.details.iter().map(|d| d.date.as_str()).collect();
    assert_eq!(
        dates,
        vec!["Friday, June 13", "Monday, June 2", "Tuesday, July 1"]
    );
    assert_eq!(report.earliest_date.as_deref(), Some("Friday, June 13"));
    assert_eq!(disposals.load(Ordering::SeqCst), 1);
}

#[test]
fn in_place_strategy_produces_the_same_report() {
    let driver = FakeDriver::new(vec![
        vec![date("Friday, June 13", 3), date("Monday, June 2", 2)],
        vec![date("Tuesday, July 1", 4)],
    ])
    .with_next_month();
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::InPlace, RetentionPolicy::KeepAll),
    );

    assert!(report.success);
    assert_eq!(report.available_days, 3);
    assert_eq!(report.total_slots, 9);
    assert_eq!(report.earliest_date.as_deref(), Some("Friday, June 13"));
}

#[test]
fn heuristic_fallback_counts_time_like_buttons_only() {
    // Structural selectors find nothing; the count comes from buttons
    // carrying a time token, and the navigation chrome is excluded.
    let driver = FakeDriver::new(vec![vec![date("Monday, June 9", 5)]]).heuristic_only();
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::KeepAll),
    );

    assert!(report.success);
    assert_eq!(report.total_slots, 5);
    assert_eq!(report.details[0].slots, 5);
}

#[test]
fn unrelocatable_date_records_zero_and_run_continues() {
    let driver = FakeDriver::new(vec![vec![
        date("Monday, June 2", 2),
        vanishing("Tuesday, June 3", 7),
        date("Wednesday, June 4", 1),
    ]]);
    let disposals = driver.disposal_counter();
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::KeepAll),
    );

    assert!(report.success);
    let slots: Vec<usize> = report.details.iter().map(|d| d.slots).collect();
    assert_eq!(slots, vec![2, 0, 1]);
    assert_eq!(report.total_slots, 3);
    assert_eq!(report.available_days, 3);
    assert_eq!(disposals.load(Ordering::SeqCst), 1);
}

#[test]
fn non_zero_only_retention_drops_empty_dates() {
    let driver = FakeDriver::new(vec![vec![
        date("Monday, June 2", 2),
        vanishing("Tuesday, June 3", 7),
        date("Wednesday, June 4", 1),
    ]]);
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::NonZeroOnly),
    );

    assert_eq!(report.available_days, 2);
    assert_eq!(report.available_days, report.details.len());
    assert_eq!(report.total_slots, 3);
    assert_eq!(report.earliest_date.as_deref(), Some("Monday, June 2"));
}

#[test]
fn empty_calendar_without_next_month_is_a_successful_empty_report() {
    let driver = FakeDriver::new(vec![vec![]]);
    let disposals = driver.disposal_counter();
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::KeepAll),
    );

    assert!(report.success);
    assert_eq!(report.available_days, 0);
    assert_eq!(report.total_slots, 0);
    assert_eq!(report.earliest_date, None);
    assert!(report.details.is_empty());
    assert!(report.error.is_none());
    assert_eq!(disposals.load(Ordering::SeqCst), 1);
}

#[test]
fn calendar_never_loading_fails_the_report_and_disposes() {
    let driver = FakeDriver::new(vec![vec![date("Monday, June 2", 2)]]).without_calendar();
    let disposals = driver.disposal_counter();
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::KeepAll),
    );

    assert!(!report.success);
    assert!(!report.error.as_deref().unwrap_or_default().is_empty());
    assert_eq!(report.available_days, 0);
    assert!(report.details.is_empty());
    assert_eq!(disposals.load(Ordering::SeqCst), 1);
}

#[test]
fn provisioning_failure_fails_the_report_without_a_session() {
    let provider = FakeProvider::failing();

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::KeepAll),
    );

    assert!(!report.success);
    assert!(report
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("chrome executable not found"));
    assert_eq!(provider.acquires.load(Ordering::SeqCst), 1);
}

#[test]
fn panic_during_scan_is_contained_and_session_still_disposed() {
    let driver = FakeDriver::new(vec![vec![date("Monday, June 2", 2)]]).panicking();
    let disposals = driver.disposal_counter();
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::KeepAll),
    );

    assert!(!report.success);
    assert!(report
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("dom snapshot corrupted"));
    assert_eq!(disposals.load(Ordering::SeqCst), 1);
}

#[test]
fn revisit_restores_calendar_view_before_paginating() {
    // The last counted date leaves its slot panel showing, and the
    // next-month control only exists in calendar view; the checker must
    // reload the month URL before paginating or the second month is lost.
    let driver = FakeDriver::new(vec![
        vec![date("Friday, June 13", 3)],
        vec![date("Tuesday, July 1", 4)],
    ])
    .with_next_month();
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::KeepAll),
    );

    assert!(report.success);
    assert_eq!(report.available_days, 2);
    assert_eq!(report.total_slots, 7);
    assert_eq!(report.details[1].date, "Tuesday, July 1");
}

#[test]
fn pagination_never_goes_past_one_extra_month() {
    // A third month exists, but the checker stops after the second view.
    let driver = FakeDriver::new(vec![
        vec![date("Friday, June 13", 1)],
        vec![date("Tuesday, July 1", 1)],
        vec![date("Friday, August 8", 9)],
    ])
    .with_next_month();
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::KeepAll),
    );

    assert_eq!(report.available_days, 2);
    assert_eq!(report.total_slots, 2);
    assert!(report.details.iter().all(|d| !d.date.contains("August")));
}

#[test]
fn labels_without_the_availability_marker_are_ignored() {
    let driver = FakeDriver::new(vec![vec![date("Monday, June 2", 2)]])
        .with_extra_label("Sunday, June 1")
        .with_extra_label("Saturday, June 7 - No times");
    let provider = FakeProvider::with(driver);

    let report = run_check(
        &provider,
        BASE_URL,
        &config(SlotStrategy::Revisit, RetentionPolicy::KeepAll),
    );

    assert_eq!(report.available_days, 1);
    assert_eq!(report.details[0].date, "Monday, June 2");
}
