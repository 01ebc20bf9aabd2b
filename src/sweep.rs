//! Sweep runner for comparing many investment plans over one series
//!
//! Runs every plan through the same simulator configuration and reports one
//! risk/return point per plan. Plans are independent: a plan that fails is
//! reported as such and never disturbs the others.

use crate::error::Result;
use crate::series::PriceSeries;
use crate::simulation::{InvestmentPlan, ReturnSummary, RollingReturnSimulator, SimulationConfig};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

/// Risk/return point of one plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub summary: ReturnSummary,
    /// Not dominated by any other plan in the sweep (higher mean, lower std-dev)
    pub on_frontier: bool,
}

/// Outcome of one plan in a sweep; failures carry the error text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepOutcome {
    pub label: String,
    pub plan: InvestmentPlan,
    pub result: std::result::Result<SweepPoint, String>,
}

impl SweepOutcome {
    pub fn point(&self) -> Option<&SweepPoint> {
        self.result.as_ref().ok()
    }
}

/// Runs a set of plans with one shared simulator configuration
///
/// # Example
/// ```ignore
/// let sweep = PlanSweep::new(SimulationConfig::with_horizon(10.0));
/// let plans = staged_grid(12, 30.4375)?;
/// for outcome in sweep.run(&series, &plans) {
///     println!("{}: {:?}", outcome.label, outcome.point());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlanSweep {
    config: SimulationConfig,
}

impl PlanSweep {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Summary for a single plan
    pub fn run_plan(&self, series: &PriceSeries, plan: &InvestmentPlan) -> Result<ReturnSummary> {
        RollingReturnSimulator::new(self.config).simulate(series, plan)?.summary()
    }

    /// Outcomes for every plan, in input order, with the frontier marked
    pub fn run(&self, series: &PriceSeries, plans: &[InvestmentPlan]) -> Vec<SweepOutcome> {
        let mut outcomes: Vec<SweepOutcome> = plans
            .par_iter()
            .map(|plan| {
                let label = format!("{} x {}", plan.len(), plan);
                let result = match self.run_plan(series, plan) {
                    Ok(summary) => Ok(SweepPoint {
                        summary,
                        on_frontier: false,
                    }),
                    Err(e) => {
                        warn!("skipping plan {}: {}", label, e);
                        Err(e.to_string())
                    }
                };
                SweepOutcome {
                    label,
                    plan: plan.clone(),
                    result,
                }
            })
            .collect();

        mark_frontier(&mut outcomes);

        let ok = outcomes.iter().filter(|o| o.point().is_some()).count();
        info!("sweep finished: {} of {} plans succeeded", ok, outcomes.len());
        outcomes
    }
}

/// Staged plans with 1..=max_contributions contributions, `spacing_days` apart
pub fn staged_grid(max_contributions: usize, spacing_days: f64) -> Result<Vec<InvestmentPlan>> {
    (1..=max_contributions)
        .map(|n| InvestmentPlan::staged(n, spacing_days))
        .collect()
}

fn dominates(a: &ReturnSummary, b: &ReturnSummary) -> bool {
    a.mean >= b.mean && a.std_dev <= b.std_dev && (a.mean > b.mean || a.std_dev < b.std_dev)
}

fn mark_frontier(outcomes: &mut [SweepOutcome]) {
    let summaries: Vec<ReturnSummary> = outcomes
        .iter()
        .filter_map(|o| o.point().map(|p| p.summary))
        .collect();

    for outcome in outcomes.iter_mut() {
        if let Ok(point) = outcome.result.as_mut() {
            point.on_frontier = !summaries.iter().any(|other| dominates(other, &point.summary));
        }
    }
}
