//! Net present value of a dated schedule

use super::CashFlowSchedule;
use crate::series::DAYS_PER_YEAR;
use chrono::NaiveDate;

/// Net present value of `schedule` at an annual rate given in percent.
///
/// Each flow is discounted by `(1 + rate/100) ^ (years since anchor)`, with years
/// counted as days / 365.25. The anchor defaults to the schedule's earliest date.
/// Flows dated before the anchor are compounded forward. Rates at or below -100%
/// have no meaning here and produce NaN; an empty schedule is worth 0.
pub fn npv(schedule: &CashFlowSchedule, anchor: Option<NaiveDate>, annual_rate_pct: f64) -> f64 {
    let Some(anchor) = anchor.or_else(|| schedule.earliest()) else {
        return 0.0;
    };

    let base = 1.0 + annual_rate_pct / 100.0;
    if base <= 0.0 {
        return f64::NAN;
    }

    schedule
        .flows()
        .iter()
        .map(|f| f.amount / base.powf(years_between(anchor, f.date)))
        .sum()
}

pub(crate) fn years_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_YEAR
}

/// NPV and its derivative with respect to the decimal rate, over
/// `(years, amount)` terms
pub(crate) fn npv_and_derivative(terms: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let base = 1.0 + rate;
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for &(t, amount) in terms {
        let discounted = amount / base.powf(t);
        npv += discounted;
        dnpv -= t * discounted / base;
    }

    (npv, dnpv)
}
