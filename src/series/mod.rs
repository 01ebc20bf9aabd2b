//! Price series types, nearest-date lookup and CSV loading

mod lookup;
pub mod loader;

pub use lookup::{closest, closest_offset, closest_within};
pub use loader::{load_series, load_series_from_reader};

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days per year used for every date/offset conversion (averages out leap years)
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Day number of a date on a continuous axis, so fractional offsets can be compared
pub(crate) fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// One sample of a (usually inflation-adjusted) total-return index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Non-empty price samples, strictly increasing by date
///
/// Spacing between samples is irregular (weekly in practice, with holiday gaps),
/// so nothing downstream may assume a fixed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting by date and rejecting empty input, duplicate dates
    /// and non-positive or non-finite values
    pub fn new(mut points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptySeries);
        }

        if let Some(bad) = points.iter().find(|p| !p.value.is_finite() || p.value <= 0.0) {
            return Err(Error::invalid_series(format!(
                "value {} on {} is not a positive number",
                bad.value, bad.date
            )));
        }

        points.sort_by_key(|p| p.date);

        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(Error::invalid_series(format!(
                "duplicate date {}",
                pair[0].date
            )));
        }

        Ok(Self { points })
    }

    /// Build a series from `(date, value)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| PricePoint::new(date, value))
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    /// Calendar days between first and last sample
    pub fn span_days(&self) -> i64 {
        (self.last().date - self.first().date).num_days()
    }

    pub fn span_years(&self) -> f64 {
        self.span_days() as f64 / DAYS_PER_YEAR
    }
}
