//! Nearest-available-date lookup over an irregularly sampled series

use super::{day_number, PricePoint, PriceSeries};
use crate::error::{Error, Result};
use chrono::NaiveDate;

/// Sample closest to `target`; equidistant candidates resolve to the earlier date.
///
/// Unbounded: a target before the first (or after the last) sample still maps to
/// the first (or last) sample. Use [`closest_within`] when that is not acceptable.
pub fn closest(series: &PriceSeries, target: NaiveDate) -> &PricePoint {
    closest_to_day(series, day_number(target))
}

/// Sample closest to `anchor + offset_days`, where the offset may be fractional
/// (e.g. 365.25 days per year offsets)
pub fn closest_offset(series: &PriceSeries, anchor: NaiveDate, offset_days: f64) -> &PricePoint {
    closest_to_day(series, day_number(anchor) + offset_days)
}

/// Bounded lookup: fails with `OutOfRange` if `target` is outside the series span
pub fn closest_within(series: &PriceSeries, target: NaiveDate) -> Result<&PricePoint> {
    let first = series.first().date;
    let last = series.last().date;
    if target < first || target > last {
        return Err(Error::OutOfRange {
            target,
            first,
            last,
        });
    }
    Ok(closest(series, target))
}

pub(crate) fn closest_to_day(series: &PriceSeries, target_day: f64) -> &PricePoint {
    let points = series.points();
    // First sample not strictly before the target
    let idx = points.partition_point(|p| day_number(p.date) < target_day);

    if idx == 0 {
        return &points[0];
    }
    if idx == points.len() {
        return &points[points.len() - 1];
    }

    let before = &points[idx - 1];
    let after = &points[idx];
    let dist_before = target_day - day_number(before.date);
    let dist_after = day_number(after.date) - target_day;

    if dist_after < dist_before {
        after
    } else {
        before
    }
}
