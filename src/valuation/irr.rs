//! Internal Rate of Return (IRR) over irregularly dated cash flows
//!
//! Used for IRR-style reporting of a single plan's schedule

use super::present_value::{npv_and_derivative, years_between};
use super::CashFlowSchedule;
use crate::error::{Error, Result};
use log::debug;

/// Bounded root finder for the annual rate that zeroes NPV.
///
/// Newton-Raphson safeguarded by a bisection bracket: a Newton step is taken
/// only when it lands strictly inside the current bracket, otherwise the bracket
/// is halved. NPV is monotone in the rate for a schedule with one sign change,
/// so the bracket always contains the root once its end-points straddle zero.
#[derive(Debug, Clone, Copy)]
pub struct IrrSolver {
    /// Lower end of the search bracket, percent
    pub lower_pct: f64,
    /// Upper end of the search bracket, percent
    pub upper_pct: f64,
    /// Initial guess, percent
    pub guess_pct: f64,
    /// Stop once the bracket is narrower than this, in percentage points
    pub rate_tolerance_pct: f64,
    /// Stop once |NPV| is below this fraction of the largest flow
    pub npv_tolerance: f64,
    pub max_iterations: u32,
}

impl Default for IrrSolver {
    fn default() -> Self {
        Self {
            lower_pct: -99.0,
            upper_pct: 1000.0,
            guess_pct: 6.0,
            rate_tolerance_pct: 1e-9,
            npv_tolerance: 1e-10,
            max_iterations: 100,
        }
    }
}

impl IrrSolver {
    /// Solve for the annual rate (percent) at which the schedule's NPV is zero
    pub fn solve(&self, schedule: &CashFlowSchedule) -> Result<f64> {
        if !schedule.has_sign_change() {
            return Err(Error::NoSignChange);
        }
        if !(self.lower_pct > -100.0 && self.lower_pct < self.upper_pct) {
            return Err(Error::invalid_parameter(format!(
                "IRR bracket [{}, {}] must satisfy -100 < lower < upper",
                self.lower_pct, self.upper_pct
            )));
        }

        // Non-empty: has_sign_change found flows
        let anchor = schedule.flows()[0].date;
        let terms: Vec<(f64, f64)> = schedule
            .flows()
            .iter()
            .map(|f| (years_between(anchor, f.date), f.amount))
            .collect();
        let npv_tolerance = self.npv_tolerance * schedule.max_abs_amount();

        let mut low = self.lower_pct / 100.0;
        let mut high = self.upper_pct / 100.0;
        let (npv_low, _) = npv_and_derivative(&terms, low);
        let (npv_high, _) = npv_and_derivative(&terms, high);

        if npv_low.abs() <= npv_tolerance {
            return Ok(low * 100.0);
        }
        if npv_high.abs() <= npv_tolerance {
            return Ok(high * 100.0);
        }

        // Check that we have a root in this interval
        if npv_low.is_nan() || npv_high.is_nan() || npv_low.signum() == npv_high.signum() {
            return Err(Error::NonConvergence {
                iterations: 0,
                residual: npv_low.abs().min(npv_high.abs()),
            });
        }
        let low_sign = npv_low.signum();

        let guess = self.guess_pct / 100.0;
        let mut rate = if guess > low && guess < high {
            guess
        } else {
            0.5 * (low + high)
        };
        let mut residual = f64::INFINITY;

        for iteration in 1..=self.max_iterations {
            let (npv, dnpv) = npv_and_derivative(&terms, rate);
            residual = npv.abs();

            if residual <= npv_tolerance {
                debug!("IRR converged in {} iterations at {:.8}%", iteration, rate * 100.0);
                return Ok(rate * 100.0);
            }

            if npv.signum() == low_sign {
                low = rate;
            } else {
                high = rate;
            }

            if (high - low) * 100.0 < self.rate_tolerance_pct {
                let mid = 0.5 * (low + high);
                debug!("IRR bracket collapsed in {} iterations at {:.8}%", iteration, mid * 100.0);
                return Ok(mid * 100.0);
            }

            let newton = rate - npv / dnpv;
            rate = if newton.is_finite() && newton > low && newton < high {
                newton
            } else {
                0.5 * (low + high)
            };
        }

        Err(Error::NonConvergence {
            iterations: self.max_iterations,
            residual,
        })
    }
}

/// Closed-form IRR (percent) of a schedule with exactly one investment and one
/// divestment on different dates; `None` for any other shape
pub fn two_flow_irr(schedule: &CashFlowSchedule) -> Option<f64> {
    let [first, second] = schedule.flows() else {
        return None;
    };

    let years = years_between(first.date, second.date);
    let ratio = -second.amount / first.amount;
    if years <= 0.0 || !ratio.is_finite() || ratio <= 0.0 {
        return None;
    }

    Some((ratio.powf(1.0 / years) - 1.0) * 100.0)
}

/// Internal rate of return (annual, percent) of a dated schedule.
///
/// Two-flow schedules use the closed form; everything else goes through the
/// default [`IrrSolver`].
pub fn internal_rate_of_return(schedule: &CashFlowSchedule) -> Result<f64> {
    if !schedule.has_sign_change() {
        return Err(Error::NoSignChange);
    }

    match two_flow_irr(schedule) {
        Some(rate) => Ok(rate),
        None => IrrSolver::default().solve(schedule),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::{npv, CashFlow};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn staged_schedule() -> CashFlowSchedule {
        CashFlowSchedule::new(vec![
            CashFlow::new(d(1979, 8, 1), -333.33),
            CashFlow::new(d(1980, 8, 1), -333.33),
            CashFlow::new(d(1981, 8, 1), -333.33),
            CashFlow::new(d(1984, 8, 1), 1312.88),
        ])
    }

    #[test]
    fn test_ten_year_lump_sum_matches_closed_form() {
        let schedule = CashFlowSchedule::new(vec![
            CashFlow::new(d(2020, 1, 1), -100.0),
            CashFlow::new(d(2030, 1, 1), 250.0),
        ]);

        let closed = two_flow_irr(&schedule).unwrap();
        let solved = IrrSolver::default().solve(&schedule).unwrap();
        assert_relative_eq!(solved, closed, epsilon = 1e-6);
        assert_relative_eq!(internal_rate_of_return(&schedule).unwrap(), closed);

        // 3653 days is a hair over ten 365.25-day years
        let textbook = (2.5_f64.powf(0.1) - 1.0) * 100.0;
        assert_relative_eq!(closed, textbook, epsilon = 1e-2);
    }

    #[test]
    fn test_uneven_flows() {
        let schedule = CashFlowSchedule::new(vec![
            CashFlow::new(d(1983, 1, 1), 500.0),
            CashFlow::new(d(1981, 1, 1), -1000.0),
            CashFlow::new(d(1985, 1, 1), 800.0),
        ]);

        let irr = internal_rate_of_return(&schedule).unwrap();
        assert_relative_eq!(irr, 8.5700, epsilon = 1e-3);
        assert!(npv(&schedule, None, irr).abs() < 1e-6);
    }

    #[test]
    fn test_three_staged_investments() {
        let schedule = staged_schedule();
        let irr = internal_rate_of_return(&schedule).unwrap();

        assert_relative_eq!(irr, 7.0002, epsilon = 1e-3);
        assert!(npv(&schedule, None, irr).abs() < 1e-6);
    }

    #[test]
    fn test_npv_root_property_with_loss() {
        let schedule = CashFlowSchedule::new(vec![
            CashFlow::new(d(2000, 3, 1), -100.0),
            CashFlow::new(d(2000, 9, 13), -100.0),
            CashFlow::new(d(2001, 2, 28), -100.0),
            CashFlow::new(d(2003, 3, 1), 180.0),
        ]);

        let irr = internal_rate_of_return(&schedule).unwrap();
        assert!(irr < 0.0);
        assert!(npv(&schedule, None, irr).abs() < 1e-6);
    }

    #[test]
    fn test_no_sign_change() {
        let schedule = CashFlowSchedule::new(vec![
            CashFlow::new(d(2020, 1, 1), -100.0),
            CashFlow::new(d(2021, 1, 1), -100.0),
        ]);
        assert!(matches!(
            internal_rate_of_return(&schedule),
            Err(Error::NoSignChange)
        ));
        assert!(matches!(
            internal_rate_of_return(&CashFlowSchedule::default()),
            Err(Error::NoSignChange)
        ));
    }

    #[test]
    fn test_iteration_bound_is_reported() {
        let solver = IrrSolver {
            max_iterations: 2,
            guess_pct: 500.0,
            ..Default::default()
        };
        let err = solver.solve(&staged_schedule()).unwrap_err();
        assert!(matches!(err, Error::NonConvergence { iterations: 2, .. }));
    }

    #[test]
    fn test_root_outside_bracket() {
        let solver = IrrSolver {
            lower_pct: 20.0,
            upper_pct: 50.0,
            ..Default::default()
        };
        let err = solver.solve(&staged_schedule()).unwrap_err();
        assert!(matches!(err, Error::NonConvergence { iterations: 0, .. }));
    }

    #[test]
    fn test_deterministic() {
        let schedule = staged_schedule();
        let a = internal_rate_of_return(&schedule).unwrap();
        let b = internal_rate_of_return(&schedule).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_two_flow_shapes() {
        let same_day = CashFlowSchedule::new(vec![
            CashFlow::new(d(2020, 1, 1), -100.0),
            CashFlow::new(d(2020, 1, 1), 110.0),
        ]);
        assert!(two_flow_irr(&same_day).is_none());
        assert!(two_flow_irr(&staged_schedule()).is_none());
    }
}
