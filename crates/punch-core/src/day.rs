//! Per-calendar-day accumulation of assigned minutes.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Minutes of work per calendar day (UTC), keyed at day granularity
/// rather than by exact timestamp. Contributions are added exactly once,
/// at the moment a record's duration becomes known; totals never
/// decrease.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DayTotals(BTreeMap<NaiveDate, f64>);

impl DayTotals {
    /// Adds `minutes` to the day of `timestamp`. Only the session
    /// builder calls this, as durations are assigned.
    pub(crate) fn add(&mut self, minutes: f64, timestamp: DateTime<Utc>) {
        *self.0.entry(timestamp.date_naive()).or_insert(0.0) += minutes;
    }

    /// The accumulated minutes for `day`, 0 if nothing was recorded.
    pub fn get(&self, day: NaiveDate) -> f64 {
        self.0.get(&day).copied().unwrap_or(0.0)
    }

    /// Days in chronological order with their totals.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.0.iter().map(|(day, minutes)| (*day, *minutes))
    }

    /// Sum across all days.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
