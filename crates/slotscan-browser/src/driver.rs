//! Automation surface abstraction
//!
//! `PageDriver` is the seam between the scraping logic and the browser:
//! production code talks to Chrome through it, tests substitute scripted
//! doubles. One driver corresponds to exactly one browser session and one
//! report computation.

use slotscan_core::Result;
use std::time::Duration;

/// Bounded-timeout browser-automation primitives used by the scraper.
///
/// Implementations must keep per-element read failures internal: a control
/// going stale mid-scan is skipped, never surfaced as an error for the
/// whole scan. Every wait must be bounded; no method may block
/// indefinitely.
pub trait PageDriver {
    /// Load a page and block until navigation completes.
    fn goto(&self, url: &str) -> Result<()>;

    /// Block until an element matching `selector` is present in the DOM.
    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Collect `attr` values from every element matching `selector`, in
    /// DOM traversal order. Elements without the attribute, or whose read
    /// fails, are skipped.
    fn attr_values(&self, selector: &str, attr: &str) -> Result<Vec<String>>;

    /// Click the first element matching `selector` whose `attr` value
    /// contains every needle. Returns `false` when no element matches.
    fn click_where_attr(&self, selector: &str, attr: &str, needles: &[&str]) -> Result<bool>;

    /// Click the first element matching `selector`. Returns `false` when
    /// none exists.
    fn click(&self, selector: &str) -> Result<bool>;

    /// Number of elements matching `selector`.
    fn count(&self, selector: &str) -> Result<usize>;

    /// Accessible label (or visible text, when unlabeled) of every button
    /// on the page, in DOM order.
    fn button_labels(&self) -> Result<Vec<String>>;

    /// Navigate one step back in history.
    fn back(&self) -> Result<()>;

    /// URL of the currently displayed page.
    fn current_url(&self) -> String;

    /// Fixed settle delay, used only where no DOM readiness signal exists.
    fn settle(&self, delay: Duration);

    /// Release the underlying browser resources. Called exactly once per
    /// session, on every exit path.
    fn dispose(self) -> Result<()>
    where
        Self: Sized;
}

/// Hands out a fresh session per availability check. Sessions are never
/// reused across checks.
pub trait SessionProvider {
    type Session: PageDriver;

    fn acquire(&self) -> Result<Self::Session>;
}
