//! Walk-forward ROR - historical rate-of-return statistics for staged investment plans
//!
//! This library provides:
//! - Nearest-available-date lookup over irregularly sampled price series
//! - Net present value and internal rate of return over dated cash flows
//! - Walk-forward rolling rate-of-return simulation with summary statistics
//! - Plan sweeps with risk/return frontier marking

pub mod error;
pub mod series;
pub mod valuation;
pub mod simulation;
pub mod sweep;

// Re-export commonly used types
pub use error::{Error, Result};
pub use series::{closest, PricePoint, PriceSeries};
pub use valuation::{internal_rate_of_return, npv, CashFlow, CashFlowSchedule};
pub use simulation::{
    simulate, InvestmentPlan, ReturnObservation, ReturnSample, ReturnSummary,
    RollingReturnSimulator, SimulationConfig,
};
pub use sweep::PlanSweep;
