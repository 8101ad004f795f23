//! # slotscan-browser
//!
//! Headless-browser scraping core for the slotscan availability checker.
//!
//! The crate drives Chrome over the DevTools Protocol behind the
//! [`driver::PageDriver`] seam: [`calendar`] waits for the widget and
//! paginates one month forward, [`dates`] enumerates bookable dates in the
//! current view, [`slots`] reveals and counts time slots per date, and
//! [`checker`] folds at most two month views into an
//! [`slotscan_core::AvailabilityReport`].
//!
//! Everything runs strictly sequentially within one session: each
//! interaction mutates shared page state that must settle before the next
//! one begins.

pub mod browser;
pub mod calendar;
pub mod checker;
pub mod dates;
pub mod driver;
pub mod slots;

pub use browser::{resolve_browser_binary, BrowserConfig, BrowserSession, ChromeProvider};
pub use calendar::{CalendarNavigator, MonthAdvance};
pub use checker::run_check;
pub use dates::DateEnumerator;
pub use driver::{PageDriver, SessionProvider};
pub use slots::{DateOutcome, SlotCounter};
