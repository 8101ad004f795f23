//! Availability report types
//!
//! A report is built fresh for every check and discarded once the response
//! is sent; nothing here persists.

use serde::{Deserialize, Serialize};

/// Slot count for one discovered date. The date is the accessible-label
/// prefix as the page renders it (e.g. "Monday, June 10"), scoped to the
/// month view it was discovered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayResult {
    pub date: String,
    pub slots: usize,
}

/// What to do with dates that counted zero slots.
///
/// The page sometimes advertises a date as bookable whose slot panel turns
/// out empty (or fails to count); whether such dates belong in the report
/// is a policy choice, fixed here as configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep every discovered date, zero-slot ones included.
    #[default]
    KeepAll,
    /// Keep only dates with at least one counted slot.
    NonZeroOnly,
}

/// Final report for one availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub success: bool,
    pub available_days: usize,
    pub total_slots: usize,
    pub earliest_date: Option<String>,
    pub details: Vec<DayResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AvailabilityReport {
    /// Fold per-date results into a successful report, applying the
    /// retention policy.
    ///
    /// `details` keeps discovery order: DOM traversal within a view,
    /// current month before next month. `earliest_date` is therefore the
    /// first discovered entry, not the chronological minimum — the page's
    /// accessibility markup does not guarantee traversal order matches
    /// calendar order, and this limitation is kept as documented behavior.
    pub fn from_days(days: Vec<DayResult>, policy: RetentionPolicy) -> Self {
        let details: Vec<DayResult> = match policy {
            RetentionPolicy::KeepAll => days,
            RetentionPolicy::NonZeroOnly => days.into_iter().filter(|d| d.slots > 0).collect(),
        };
        // Dropped entries are all zero, so this equals the sum over every
        // processed date under either policy.
        let total_slots = details.iter().map(|d| d.slots).sum();
        Self {
            success: true,
            available_days: details.len(),
            total_slots,
            earliest_date: details.first().map(|d| d.date.clone()),
            details,
            error: None,
        }
    }

    /// Report for a fatal condition. Carries no partial results.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            available_days: 0,
            total_slots: 0,
            earliest_date: None,
            details: Vec::new(),
            error: Some(message.into()),
        }
    }
}
