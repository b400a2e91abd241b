//! Purchase-date range filtering.

use crate::frame::Frame;
use chrono::{NaiveDate, NaiveDateTime};
use ecomdash_common::OrderRecord;
use ecomdash_config::FilterConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Calendar date range, both ends inclusive.
///
/// `start` covers the day from midnight and `end` covers the day through its
/// last instant. A range whose start is after its end matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Range that matches every representable instant.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        let day = instant.date();
        self.start <= day && day <= self.end
    }

    /// True when no instant can fall inside the range.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Everything a dashboard rerun depends on besides the loaded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterParams {
    pub range: DateRange,
}

impl FilterParams {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            range: DateRange::new(start, end),
        }
    }

    /// Resolve configured bounds, falling back to the data set's own span
    /// for whichever end is unset.
    pub fn resolve(config: &FilterConfig, bounds: Option<(NaiveDate, NaiveDate)>) -> Self {
        let fallback = bounds
            .map(|(start, end)| DateRange::new(start, end))
            .unwrap_or_else(DateRange::unbounded);

        Self::new(
            config.start_date.unwrap_or(fallback.start),
            config.end_date.unwrap_or(fallback.end),
        )
    }
}

impl From<DateRange> for FilterParams {
    fn from(range: DateRange) -> Self {
        Self { range }
    }
}

/// Keep the orders purchased inside `range`, in their original order.
pub fn filter_by_date<'a>(orders: &Frame<'a, OrderRecord>, range: &DateRange) -> Frame<'a, OrderRecord> {
    if range.is_empty() {
        debug!(%range, "Empty date range, no rows selected");
        return Frame::from_refs(Vec::new());
    }

    let filtered = orders.filter(|order| range.contains(&order.purchased_at));
    debug!(%range, input = orders.len(), output = filtered.len(), "Filtered orders by date");
    filtered
}
