//! Cash-flow valuation: net present value and internal rate of return over
//! irregularly dated schedules

mod present_value;
mod irr;
pub mod loader;

pub use present_value::npv;
pub use irr::{internal_rate_of_return, two_flow_irr, IrrSolver};
pub use loader::{load_schedule, load_schedule_from_reader};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dated cash flow (negative = investment, positive = divestment)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: f64,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Cash flows kept sorted by date; flows on the same date keep insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSchedule")]
pub struct CashFlowSchedule {
    flows: Vec<CashFlow>,
}

/// Wire shape of a schedule, sorted by [`CashFlowSchedule::new`] on the way in
#[derive(Deserialize)]
struct RawSchedule {
    flows: Vec<CashFlow>,
}

impl From<RawSchedule> for CashFlowSchedule {
    fn from(raw: RawSchedule) -> Self {
        Self::new(raw.flows)
    }
}

impl CashFlowSchedule {
    pub fn new(mut flows: Vec<CashFlow>) -> Self {
        flows.sort_by_key(|f| f.date);
        Self { flows }
    }

    /// Insert a flow at its date position
    pub fn push(&mut self, flow: CashFlow) {
        let idx = self.flows.partition_point(|f| f.date <= flow.date);
        self.flows.insert(idx, flow);
    }

    pub fn flows(&self) -> &[CashFlow] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Date of the first flow, the default NPV anchor
    pub fn earliest(&self) -> Option<NaiveDate> {
        self.flows.first().map(|f| f.date)
    }

    /// Sum of investments, as a positive number
    pub fn total_invested(&self) -> f64 {
        -self.flows.iter().filter(|f| f.amount < 0.0).map(|f| f.amount).sum::<f64>()
    }

    /// Sum of divestments
    pub fn total_returned(&self) -> f64 {
        self.flows.iter().filter(|f| f.amount > 0.0).map(|f| f.amount).sum()
    }

    /// True when there is at least one outflow and one inflow
    pub fn has_sign_change(&self) -> bool {
        let has_positive = self.flows.iter().any(|f| f.amount > 0.0);
        let has_negative = self.flows.iter().any(|f| f.amount < 0.0);
        has_positive && has_negative
    }

    pub(crate) fn max_abs_amount(&self) -> f64 {
        self.flows.iter().map(|f| f.amount.abs()).fold(0.0, f64::max)
    }
}

impl FromIterator<CashFlow> for CashFlowSchedule {
    fn from_iter<I: IntoIterator<Item = CashFlow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
