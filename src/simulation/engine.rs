//! Walk-forward rolling rate-of-return simulator

use super::plan::InvestmentPlan;
use super::sample::{ReturnObservation, ReturnSample};
use crate::error::{Error, Result};
use crate::series::{closest_offset, day_number, PricePoint, PriceSeries, DAYS_PER_YEAR};
use crate::valuation::{internal_rate_of_return, CashFlow, CashFlowSchedule};
use chrono::NaiveDate;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Default contribution per plan step, in currency units
pub const DEFAULT_CONTRIBUTION: f64 = 100.0;

/// Default holding horizon, in years
pub const DEFAULT_HORIZON_YEARS: f64 = 10.0;

/// How each anchor's outcome is turned into an annual rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnMethod {
    /// Total gain divided linearly by the horizon (not compounded)
    SimpleAnnualized,
    /// IRR of the anchor's dated cash flows
    Irr,
}

/// Configuration for a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Years between anchor and liquidation (365.25-day years)
    pub horizon_years: f64,

    /// Currency amount invested at every plan offset
    pub contribution: f64,

    pub method: ReturnMethod,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_years: DEFAULT_HORIZON_YEARS,
            contribution: DEFAULT_CONTRIBUTION,
            method: ReturnMethod::SimpleAnnualized,
        }
    }
}

impl SimulationConfig {
    pub fn with_horizon(horizon_years: f64) -> Self {
        Self {
            horizon_years,
            ..Default::default()
        }
    }

    pub fn horizon_days(&self) -> f64 {
        self.horizon_years * DAYS_PER_YEAR
    }

    fn validate(&self, plan: &InvestmentPlan) -> Result<()> {
        if !(self.horizon_years.is_finite() && self.horizon_years > 0.0) {
            return Err(Error::invalid_plan(format!(
                "horizon {} must be a positive number of years",
                self.horizon_years
            )));
        }
        if !(self.contribution.is_finite() && self.contribution > 0.0) {
            return Err(Error::invalid_plan(format!(
                "contribution {} must be positive",
                self.contribution
            )));
        }
        if plan.last_offset() > self.horizon_days() {
            return Err(Error::invalid_plan(format!(
                "offset {} days falls after the {}-year horizon",
                plan.last_offset(),
                self.horizon_years
            )));
        }
        Ok(())
    }
}

/// Runs one investment plan from every eligible anchor date of a series
#[derive(Debug, Clone, Default)]
pub struct RollingReturnSimulator {
    config: SimulationConfig,
}

impl RollingReturnSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// One observation per anchor with a full horizon of data after it, in
    /// ascending anchor order.
    ///
    /// A horizon longer than the series yields an empty sample, not an error.
    pub fn simulate(&self, series: &PriceSeries, plan: &InvestmentPlan) -> Result<ReturnSample> {
        self.config.validate(plan)?;

        let anchors = eligible_anchors(series, self.config.horizon_days());
        if anchors.is_empty() {
            warn!(
                "{}-year horizon exceeds the {:.2}-year series span; no eligible anchors",
                self.config.horizon_years,
                series.span_years()
            );
            return Ok(ReturnSample::default());
        }

        debug!(
            "simulating plan {} over {} of {} anchors ({:?})",
            plan,
            anchors.len(),
            series.len(),
            self.config.method
        );

        let observations = anchors
            .par_iter()
            .map(|anchor| self.observe(series, anchor, plan))
            .collect::<Result<Vec<_>>>()?;

        Ok(ReturnSample::new(observations))
    }

    fn observe(
        &self,
        series: &PriceSeries,
        anchor: &PricePoint,
        plan: &InvestmentPlan,
    ) -> Result<ReturnObservation> {
        let schedule = build_schedule(
            series,
            anchor.date,
            plan,
            self.config.contribution,
            self.config.horizon_days(),
        );

        let ror = match self.config.method {
            ReturnMethod::SimpleAnnualized => simple_annualized_return(
                schedule.total_invested(),
                schedule.total_returned(),
                self.config.horizon_years,
            ),
            ReturnMethod::Irr => internal_rate_of_return(&schedule)?,
        };

        Ok(ReturnObservation {
            start_date: anchor.date,
            ror,
        })
    }
}

/// Walk-forward simulation with the default contribution and simple annualized returns
pub fn simulate(
    series: &PriceSeries,
    plan: &InvestmentPlan,
    horizon_years: f64,
) -> Result<ReturnSample> {
    RollingReturnSimulator::new(SimulationConfig::with_horizon(horizon_years))
        .simulate(series, plan)
}

/// Cash flows of one plan anchored at `anchor`: an investment of `contribution`
/// at the sample nearest each offset, then liquidation of all shares at the sample
/// nearest `anchor + horizon_days`.
///
/// Flows carry the actual sample dates, not the requested ones.
pub fn build_schedule(
    series: &PriceSeries,
    anchor: NaiveDate,
    plan: &InvestmentPlan,
    contribution: f64,
    horizon_days: f64,
) -> CashFlowSchedule {
    let mut flows = Vec::with_capacity(plan.len() + 1);
    let mut shares = 0.0;

    for &offset in plan.offsets() {
        let point = closest_offset(series, anchor, offset);
        shares += contribution / point.value;
        flows.push(CashFlow::new(point.date, -contribution));
    }

    let terminal = closest_offset(series, anchor, horizon_days);
    flows.push(CashFlow::new(terminal.date, shares * terminal.value));

    CashFlowSchedule::new(flows)
}

/// `((divest / invested) - 1) / years * 100`
pub fn simple_annualized_return(invested: f64, divest: f64, horizon_years: f64) -> f64 {
    ((divest / invested) - 1.0) / horizon_years * 100.0
}

/// Anchors whose full horizon fits inside the series; a prefix, since dates ascend
fn eligible_anchors(series: &PriceSeries, horizon_days: f64) -> &[PricePoint] {
    let last_day = day_number(series.last().date);
    let points = series.points();
    let count = points.partition_point(|p| day_number(p.date) + horizon_days <= last_day);
    &points[..count]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::closest;
    use crate::valuation::{npv, two_flow_irr};
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// First-of-month samples growing at `rate` per 365.25-day year
    fn compounding_series(years: i32, rate: f64) -> PriceSeries {
        let start = d(1970, 1, 1);
        let mut pairs = Vec::new();
        for y in 0..years {
            for m in 1..=12 {
                let date = d(1970 + y, m, 1);
                let t = (date - start).num_days() as f64 / DAYS_PER_YEAR;
                pairs.push((date, 100.0 * (1.0 + rate).powf(t)));
            }
        }
        PriceSeries::from_pairs(pairs).unwrap()
    }

    /// Weekly samples, rising on trend with a deterministic wobble
    fn wobbly_series(weeks: i64) -> PriceSeries {
        let start = d(1990, 1, 1);
        PriceSeries::from_pairs((0..weeks).map(|w| {
            let t = w as f64 / 52.0;
            let trend = 100.0 * 1.06_f64.powf(t);
            let wobble = 1.0 + 0.25 * (t * 1.3).sin() + 0.1 * (t * 4.1).cos();
            (start + Duration::weeks(w), trend * wobble)
        }))
        .unwrap()
    }

    /// Weekly samples that only ever rise, with a growth rate that swings slowly
    fn accelerating_series(weeks: i64) -> PriceSeries {
        let start = d(1990, 1, 1);
        let mut price = 100.0;
        PriceSeries::from_pairs((0..weeks).map(|w| {
            let t = w as f64 / 52.0;
            price *= 1.0 + 0.002 + 0.003 * (1.0 + (0.9 * t).sin());
            (start + Duration::weeks(w), price)
        }))
        .unwrap()
    }

    #[test]
    fn test_lump_sum_schedule_dates() {
        let series = compounding_series(30, 0.07);
        let schedule = build_schedule(
            &series,
            d(1970, 1, 1),
            &InvestmentPlan::lump_sum(),
            1000.0,
            (365.25_f64 * 10.0).floor(),
        );

        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.flows()[1].date, d(1980, 1, 1));

        let irr = two_flow_irr(&schedule).unwrap();
        assert!((7.0 - irr).abs() < 0.01, "expected ~7% IRR, got {}", irr);
    }

    #[test]
    fn test_staged_schedule_irr() {
        let series = compounding_series(30, 0.07);
        let plan = InvestmentPlan::new(vec![0.0, 365.0, 730.0]).unwrap();
        let schedule = build_schedule(
            &series,
            d(1979, 7, 23),
            &plan,
            1000.0,
            (365.25_f64 * 5.0).floor(),
        );

        assert_eq!(schedule.len(), 4);
        assert_relative_eq!(schedule.total_invested(), 3000.0);

        let irr = internal_rate_of_return(&schedule).unwrap();
        assert!((7.0 - irr).abs() < 0.01, "expected ~7% IRR, got {}", irr);
        assert!(npv(&schedule, None, irr).abs() < 1e-6);
    }

    #[test]
    fn test_single_offset_matches_simple_formula() {
        let series = wobbly_series(52 * 15);
        let sample = simulate(&series, &InvestmentPlan::lump_sum(), 5.0).unwrap();
        assert!(!sample.is_empty());

        for obs in sample.observations().iter().step_by(37) {
            let start = closest(&series, obs.start_date);
            let terminal = closest_offset(&series, obs.start_date, 5.0 * DAYS_PER_YEAR);
            let expected = ((terminal.value / start.value) - 1.0) / 5.0 * 100.0;
            assert_relative_eq!(obs.ror, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_eligibility_window() {
        let series = wobbly_series(52 * 12);
        let sample = simulate(&series, &InvestmentPlan::lump_sum(), 10.0).unwrap();

        let last = series.last().date;
        let horizon = 10.0 * DAYS_PER_YEAR;
        for obs in sample.observations() {
            assert!(day_number(obs.start_date) + horizon <= day_number(last));
        }
        // The first skipped anchor really lacks the data
        let next = series.points()[sample.len()].date;
        assert!(day_number(next) + horizon > day_number(last));
    }

    #[test]
    fn test_eligibility_monotone_in_horizon() {
        let series = wobbly_series(52 * 12);
        let plan = InvestmentPlan::lump_sum();

        let mut previous = usize::MAX;
        for horizon in [0.5, 1.0, 2.0, 5.0, 8.0, 11.0, 11.9, 13.0] {
            let count = simulate(&series, &plan, horizon).unwrap().len();
            assert!(count <= previous, "{} anchors at {} years", count, horizon);
            previous = count;
        }
    }

    #[test]
    fn test_horizon_beyond_span_is_empty() {
        let series = wobbly_series(52 * 3);
        let sample = simulate(&series, &InvestmentPlan::lump_sum(), 10.0).unwrap();
        assert!(sample.is_empty());
        assert!(matches!(sample.summary(), Err(Error::NoEligibleWindow)));
    }

    #[test]
    fn test_output_ascending_and_deterministic() {
        let series = wobbly_series(52 * 10);
        let plan = InvestmentPlan::staged(3, 365.25).unwrap();

        let a = simulate(&series, &plan, 4.0).unwrap();
        let b = simulate(&series, &plan, 4.0).unwrap();

        assert!(a.observations().windows(2).all(|w| w[0].start_date < w[1].start_date));
        assert_eq!(a.len(), b.len());
        for (x, y) in a.observations().iter().zip(b.observations()) {
            assert_eq!(x.start_date, y.start_date);
            assert_eq!(x.ror.to_bits(), y.ror.to_bits());
        }
    }

    #[test]
    fn test_constant_growth_simple_return() {
        // 7% compounded for 10 years is (1.07^10 - 1) / 10 simple
        let series = compounding_series(30, 0.07);
        let sample = simulate(&series, &InvestmentPlan::lump_sum(), 10.0).unwrap();
        let expected = (1.07_f64.powi(10) - 1.0) / 10.0 * 100.0;

        for obs in sample.observations() {
            assert!((obs.ror - expected).abs() < 0.1, "{} vs {}", obs.ror, expected);
        }
    }

    #[test]
    fn test_irr_method() {
        let series = compounding_series(30, 0.07);
        let config = SimulationConfig {
            horizon_years: 5.0,
            method: ReturnMethod::Irr,
            ..Default::default()
        };
        let plan = InvestmentPlan::staged(3, 365.25).unwrap();
        let sample = RollingReturnSimulator::new(config).simulate(&series, &plan).unwrap();

        assert!(!sample.is_empty());
        for obs in sample.observations() {
            assert!((obs.ror - 7.0).abs() < 0.05, "{} on {}", obs.ror, obs.start_date);
        }
    }

    #[test]
    fn test_staged_plan_reduces_dispersion() {
        let series = wobbly_series(52 * 40);

        let lump = simulate(&series, &InvestmentPlan::lump_sum(), 10.0).unwrap();
        let staged = simulate(&series, &InvestmentPlan::staged(3, 365.25).unwrap(), 10.0).unwrap();

        assert_eq!(lump.len(), staged.len());
        let lump_sd = lump.summary().unwrap().std_dev;
        let staged_sd = staged.summary().unwrap().std_dev;
        assert!(staged_sd <= lump_sd, "staged {} vs lump {}", staged_sd, lump_sd);
    }

    #[test]
    fn test_staged_plan_reduces_dispersion_on_rising_series() {
        let series = accelerating_series(52 * 40);
        assert!(series.points().windows(2).all(|w| w[1].value > w[0].value));

        let lump = simulate(&series, &InvestmentPlan::lump_sum(), 10.0).unwrap();
        let staged = simulate(&series, &InvestmentPlan::staged(3, 365.25).unwrap(), 10.0).unwrap();

        assert_eq!(lump.len(), staged.len());
        let lump_sd = lump.summary().unwrap().std_dev;
        let staged_sd = staged.summary().unwrap().std_dev;
        assert!(staged_sd <= lump_sd, "staged {} vs lump {}", staged_sd, lump_sd);
    }

    #[test]
    fn test_invalid_config() {
        let series = wobbly_series(52 * 3);
        let plan = InvestmentPlan::staged(3, 365.25).unwrap();

        assert!(matches!(
            simulate(&series, &plan, 1.0),
            Err(Error::InvalidPlan { .. })
        ));
        assert!(matches!(
            simulate(&series, &InvestmentPlan::lump_sum(), 0.0),
            Err(Error::InvalidPlan { .. })
        ));

        let config = SimulationConfig {
            contribution: -5.0,
            ..SimulationConfig::with_horizon(1.0)
        };
        assert!(matches!(
            RollingReturnSimulator::new(config).simulate(&series, &InvestmentPlan::lump_sum()),
            Err(Error::InvalidPlan { .. })
        ));
    }
}
